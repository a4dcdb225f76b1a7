//! Writing arrays out as dada files

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use byte_slice_cast::AsByteSlice;
use ndarray::{ArrayBase, ArrayView2, Axis, Data, Dimension, Ix1, Ix2};
use num_traits::AsPrimitive;
use tracing::{debug, info};

use crate::{
    dada::{DadaConfig, DadaHeader, Layout, Nbit, Order},
    error::DadaError,
};

/// Samples cast to the on-disk encoding
#[derive(Debug, PartialEq)]
pub enum Samples {
    I8(Vec<i8>),
    I16(Vec<i16>),
    F32(Vec<f32>),
}

impl Samples {
    /// Cast in flatten order.
    ///
    /// Values go through `f64` and Rust's `as`, so narrowing to integers
    /// truncates toward zero and saturates at the type's bounds (NaN becomes 0).
    fn cast<'a, A, I>(values: I, nbit: Nbit) -> Self
    where
        A: AsPrimitive<f64>,
        I: Iterator<Item = &'a A>,
    {
        let values = values.map(|&v| AsPrimitive::<f64>::as_(v));
        match nbit {
            Nbit::I8 => Samples::I8(values.map(|v| v as i8).collect()),
            Nbit::I16 => Samples::I16(values.map(|v| v as i16).collect()),
            Nbit::F32 => Samples::F32(values.map(|v| v as f32).collect()),
        }
    }

    /// Native-endian bytes, as they go on disk
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Samples::I8(v) => v.as_byte_slice(),
            Samples::I16(v) => v.as_byte_slice(),
            Samples::F32(v) => v.as_byte_slice(),
        }
    }
}

/// A validated, fully encoded dada file held in memory
#[derive(Debug)]
pub struct Encoded {
    pub layout: Layout,
    pub header: Vec<u8>,
    pub samples: Samples,
}

/// Validate `data` against `config`, then build the header and cast the samples.
///
/// 1-D arrays are a single channel, 2-D arrays are (channel, time).
pub fn encode<A, S, D>(data: &ArrayBase<S, D>, config: &DadaConfig) -> Result<Encoded, DadaError>
where
    A: AsPrimitive<f64>,
    S: Data<Elem = A>,
    D: Dimension,
{
    let layout = Layout::new(data.shape(), config)?;
    let header = DadaHeader::build(config, &layout)?.to_bytes()?;
    let view: ArrayView2<A> = match layout.order {
        Order::T => data
            .view()
            .into_dimensionality::<Ix1>()?
            .insert_axis(Axis(0)),
        _ => data.view().into_dimensionality::<Ix2>()?,
    };
    // Logical iteration of the transposed view is the column-major flatten
    let view = match layout.order {
        Order::FT => view,
        Order::TF | Order::T => view.reversed_axes(),
    };
    let samples = Samples::cast(view.iter(), layout.nbit);
    Ok(Encoded {
        layout,
        header,
        samples,
    })
}

/// Write `data` as a dada stream to `writer`
pub fn write_dada_to<A, S, D, W>(
    writer: &mut W,
    data: &ArrayBase<S, D>,
    config: &DadaConfig,
) -> Result<Layout, DadaError>
where
    A: AsPrimitive<f64>,
    S: Data<Elem = A>,
    D: Dimension,
    W: Write,
{
    let encoded = encode(data, config)?;
    writer.write_all(&encoded.header)?;
    writer.write_all(encoded.samples.as_bytes())?;
    writer.flush()?;
    Ok(encoded.layout)
}

/// Save an array to a dada file at `out_name`, creating or truncating it.
///
/// Everything is validated and encoded before the file is touched, so a
/// rejected array or config never creates or modifies `out_name`.
pub fn write_dada<A, S, D, P>(
    data: &ArrayBase<S, D>,
    out_name: P,
    config: &DadaConfig,
) -> Result<(), DadaError>
where
    A: AsPrimitive<f64>,
    S: Data<Elem = A>,
    D: Dimension,
    P: AsRef<Path>,
{
    let out_name = out_name.as_ref();
    let encoded = encode(data, config)?;
    debug!(
        nchan = encoded.layout.nchan,
        nsamps = encoded.layout.nsamps,
        nbit = encoded.layout.nbit.bits(),
        order = %encoded.layout.order,
        "Encoded dada payload"
    );
    let mut file = BufWriter::new(File::create(out_name)?);
    file.write_all(&encoded.header)?;
    file.write_all(encoded.samples.as_bytes())?;
    file.flush()?;
    info!("Successfully written data to {}", out_name.display());
    Ok(())
}
