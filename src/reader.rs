//! Reading dada files back into (channel, time) arrays

use std::{fs, path::Path};

use ndarray::Array2;
use tracing::debug;

use crate::{
    dada::{DadaHeader, Nbit, Order},
    error::DadaError,
};

/// A dada file with its samples decoded to `f32`
#[derive(Clone, Debug)]
pub struct DadaFile {
    pub header: DadaHeader,
    /// Shape (nchan, nsamps)
    pub data: Array2<f32>,
}

impl DadaFile {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DadaError> {
        let header = DadaHeader::parse(bytes)?;
        let header_size = header.header_size();
        let nbit = Nbit::try_from(header.get_parsed::<u32>("NBIT")?)?;
        let nchan: usize = header.get_parsed("NCHAN")?;
        let nsamps: usize = header.get_parsed("NSAMPS")?;
        let order: Order = header
            .get("ORDER")
            .ok_or_else(|| DadaError::MalformedHeader("missing ORDER".to_owned()))?
            .parse()?;

        let expected = nchan
            .checked_mul(nsamps)
            .and_then(|n| n.checked_mul(nbit.bytes()))
            .ok_or_else(|| {
                DadaError::MalformedHeader(format!(
                    "NCHAN {nchan} x NSAMPS {nsamps} overflows the payload size"
                ))
            })?;
        let payload = bytes
            .get(header_size..)
            .filter(|payload| payload.len() >= expected)
            .ok_or_else(|| {
                DadaError::MalformedHeader(format!(
                    "expected {expected} bytes of data after a {header_size} byte header, file is {} bytes",
                    bytes.len()
                ))
            })?;
        let payload = &payload[..expected];

        let values: Vec<f32> = match nbit {
            Nbit::I8 => payload.iter().map(|&b| b as i8 as f32).collect(),
            Nbit::I16 => payload
                .chunks_exact(2)
                .map(|c| i16::from_ne_bytes([c[0], c[1]]) as f32)
                .collect(),
            Nbit::F32 => payload
                .chunks_exact(4)
                .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
        };
        debug!(nchan, nsamps, nbit = nbit.bits(), %order, "Decoded dada payload");

        let data = match order {
            Order::FT => Array2::from_shape_vec((nchan, nsamps), values)?,
            Order::TF | Order::T => {
                Array2::from_shape_vec((nsamps, nchan), values)?.reversed_axes()
            }
        };
        Ok(Self { header, data })
    }
}

/// Read and decode the dada file at `path`
pub fn read_dada<P: AsRef<Path>>(path: P) -> Result<DadaFile, DadaError> {
    DadaFile::from_bytes(&fs::read(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dada::DadaConfig, writer::write_dada_to};
    use ndarray::{array, Array1};

    fn round_trip(data: &Array2<f64>, config: &DadaConfig) -> DadaFile {
        let mut buf = vec![];
        write_dada_to(&mut buf, data, config).unwrap();
        DadaFile::from_bytes(&buf).unwrap()
    }

    #[test]
    fn test_round_trip_orders() {
        let data = array![[0.0, 1.0, 2.0, 3.0], [4.0, 5.0, 6.0, 7.0]];
        for order in ["TF", "FT"] {
            let config = DadaConfig {
                order: order.to_owned(),
                ..Default::default()
            };
            let file = round_trip(&data, &config);
            assert_eq!(file.data, data.mapv(|v| v as f32));
            assert_eq!(file.header.get("ORDER"), Some(order));
        }
    }

    #[test]
    fn test_round_trip_int8() {
        let data = array![[-3.7, 2.2], [100.0, 500.0]];
        let config = DadaConfig {
            nbit: 8,
            ..Default::default()
        };
        let file = round_trip(&data, &config);
        assert_eq!(file.data, array![[-3.0, 2.0], [100.0, 127.0]]);
    }

    #[test]
    fn test_single_channel() {
        let data: Array1<f64> = Array1::linspace(-1.0, 1.0, 9);
        let mut buf = vec![];
        write_dada_to(&mut buf, &data, &DadaConfig::default()).unwrap();
        let file = DadaFile::from_bytes(&buf).unwrap();
        assert_eq!(file.data.shape(), &[1, 9]);
        assert_eq!(file.header.get("ORDER"), Some("T"));
        assert_eq!(file.data.row(0), data.mapv(|v| v as f32));
    }

    #[test]
    fn test_truncated_payload() {
        let data = array![[1.0, 2.0], [3.0, 4.0]];
        let mut buf = vec![];
        write_dada_to(&mut buf, &data, &DadaConfig::default()).unwrap();
        buf.truncate(buf.len() - 1);
        assert!(matches!(
            DadaFile::from_bytes(&buf),
            Err(DadaError::MalformedHeader(_))
        ));
    }

    #[test]
    fn test_huge_dimensions() {
        let bytes = b"HDR_SIZE 64\nNBIT 32\nNCHAN 4294967296\nNSAMPS 4294967296\nORDER TF\n";
        assert!(matches!(
            DadaFile::from_bytes(bytes),
            Err(DadaError::MalformedHeader(_))
        ));
    }

    #[test]
    fn test_missing_header_size() {
        let bytes = b"NCHAN 2\nNSAMPS 4\n\0\0\0";
        assert!(matches!(
            DadaFile::from_bytes(bytes),
            Err(DadaError::MalformedHeader(_))
        ));
    }
}
