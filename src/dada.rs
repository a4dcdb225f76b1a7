//! The dada header: configuration, data layout and the fixed-size text header.
//!
//! A dada file is a block of `HDR_SIZE` bytes of `KEY<tabs>VALUE\n` text,
//! padded with NUL bytes, followed by the raw samples.

use std::{
    fmt,
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
    str::FromStr,
};

use chrono::{DateTime, Utc};

use crate::error::DadaError;

pub const DEFAULT_HEADER_SIZE: usize = 16384;

const HDR_VERSION: f64 = 1.0;
const STATE: &str = "Intensity";
const OBS_OFFSET: u64 = 0;
const NDIM: u64 = 1;
const INSTRUMENT: &str = "MOPSR";

/// Every option that ends up in the header of a written file
#[derive(Clone, Debug, PartialEq)]
pub struct DadaConfig {
    /// Size of the header in bytes, NUL padding included
    pub header_size: usize,
    pub telescope: String,
    pub source: String,
    /// Center frequency in MHz
    pub freq: f64,
    /// Bandwidth in MHz (can be negative)
    pub bw: f64,
    /// Number of polarisations, only 1 is supported
    pub npol: u32,
    /// 8 and 16 store signed integers, 32 stores floats
    pub nbit: u32,
    /// Sampling time in seconds. The header stores it in microseconds.
    pub tsamp: f64,
    pub utc_start: String,
    /// "TF" or "FT". Single channel data is always written as "T".
    pub order: String,
    /// Dispersion measure in pc cm^-3
    pub dm: f64,
}

impl Default for DadaConfig {
    fn default() -> Self {
        Self {
            header_size: DEFAULT_HEADER_SIZE,
            telescope: "MOST".to_owned(),
            source: "FAKE".to_owned(),
            freq: 835.5957031,
            bw: -31.25,
            npol: 1,
            nbit: 32,
            tsamp: 0.00032768,
            utc_start: "2018-02-12-00:00:00".to_owned(),
            order: "TF".to_owned(),
            dm: 0.0,
        }
    }
}

impl DadaConfig {
    pub fn with_utc_start(mut self, time: &DateTime<Utc>) -> Self {
        self.utc_start = utc_timestamp(time);
        self
    }
}

/// Render a timestamp the way dspsr and heimdall expect UTC_START
pub fn utc_timestamp(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%d-%H:%M:%S").to_string()
}

/// Sample encoding selected by NBIT
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Nbit {
    I8,
    I16,
    F32,
}

impl Nbit {
    pub fn bits(self) -> u32 {
        match self {
            Nbit::I8 => 8,
            Nbit::I16 => 16,
            Nbit::F32 => 32,
        }
    }

    pub fn bytes(self) -> usize {
        self.bits() as usize / 8
    }
}

impl TryFrom<u32> for Nbit {
    type Error = DadaError;

    fn try_from(nbit: u32) -> Result<Self, Self::Error> {
        match nbit {
            8 => Ok(Nbit::I8),
            16 => Ok(Nbit::I16),
            32 => Ok(Nbit::F32),
            _ => Err(DadaError::UnsupportedBitDepth(nbit)),
        }
    }
}

/// Flatten order of the samples.
///
/// `TF` is time-major (all channels of a time sample are contiguous), `FT` is
/// frequency-major and `T` marks single channel data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Order {
    TF,
    FT,
    T,
}

impl Order {
    pub fn as_str(self) -> &'static str {
        match self {
            Order::TF => "TF",
            Order::FT => "FT",
            Order::T => "T",
        }
    }
}

impl FromStr for Order {
    type Err = DadaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TF" => Ok(Order::TF),
            "FT" => Ok(Order::FT),
            "T" => Ok(Order::T),
            _ => Err(DadaError::UnsupportedOrder(s.to_owned())),
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape and encoding of the samples in a dada file
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    pub nchan: usize,
    pub nsamps: usize,
    pub nbit: Nbit,
    pub order: Order,
}

impl Layout {
    /// Validate an array shape against the config.
    ///
    /// Checks happen in a fixed order: dimensionality, bit depth,
    /// polarisations, then order.
    pub fn new(shape: &[usize], config: &DadaConfig) -> Result<Self, DadaError> {
        let (nchan, nsamps, single_channel) = match *shape {
            [nsamps] => (1, nsamps, true),
            [nchan, nsamps] => (nchan, nsamps, false),
            _ => return Err(DadaError::UnsupportedDimensionality(shape.len())),
        };
        let nbit = Nbit::try_from(config.nbit)?;
        if config.npol != 1 {
            return Err(DadaError::UnsupportedPolarizations(config.npol));
        }
        let order = if single_channel {
            Order::T
        } else {
            match config.order.parse()? {
                Order::T => return Err(DadaError::UnsupportedOrder(config.order.clone())),
                order => order,
            }
        };
        Ok(Self {
            nchan,
            nsamps,
            nbit,
            order,
        })
    }

    /// Number of payload bytes following the header
    pub fn data_size(&self) -> usize {
        self.nchan * self.nsamps * self.nbit.bytes()
    }
}

/// Render a float like Python 3's `str`: shortest round-trip digits, a
/// trailing `.0` on integral values and exponent notation outside of
/// `[1e-4, 1e16)`. Python 2's `%.12g` rendering is not reproduced; the two
/// agree on the default header values.
pub(crate) fn format_float(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_owned();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_owned();
    }
    let abs = x.abs();
    if abs == 0.0 || (1e-4..1e16).contains(&abs) {
        let s = x.to_string();
        if s.contains('.') {
            s
        } else {
            format!("{s}.0")
        }
    } else {
        let s = format!("{x:e}");
        match s.split_once('e') {
            Some((mantissa, exp)) => {
                let exp: i32 = exp.parse().unwrap_or_default();
                let sign = if exp < 0 { '-' } else { '+' };
                format!("{mantissa}e{sign}{:02}", exp.abs())
            }
            None => s,
        }
    }
}

fn text_value(key: &'static str, value: &str) -> Result<String, DadaError> {
    if value.contains(['\n', '\r', '\0']) {
        return Err(DadaError::InvalidHeaderValue {
            key,
            value: value.to_owned(),
        });
    }
    Ok(value.to_owned())
}

/// An ordered table of header keys and their rendered values
#[derive(Clone, Debug, PartialEq)]
pub struct DadaHeader {
    header_size: usize,
    fields: Vec<(String, String)>,
}

impl DadaHeader {
    /// Build the header for a write of `layout` with the options in `config`
    pub fn build(config: &DadaConfig, layout: &Layout) -> Result<Self, DadaError> {
        let fields: Vec<(&str, String)> = vec![
            ("HDR_VERSION", format_float(HDR_VERSION)),
            ("HDR_SIZE", config.header_size.to_string()),
            ("TELESCOPE", text_value("TELESCOPE", &config.telescope)?),
            ("SOURCE", text_value("SOURCE", &config.source)?),
            ("FREQ", format_float(config.freq)),
            ("BW", format_float(config.bw)),
            ("NPOL", config.npol.to_string()),
            ("NBIT", layout.nbit.bits().to_string()),
            // dspsr wants TSAMP in microseconds
            ("TSAMP", format_float(config.tsamp * 1e6)),
            ("NSAMPS", layout.nsamps.to_string()),
            ("UTC_START", text_value("UTC_START", &config.utc_start)?),
            ("STATE", STATE.to_owned()),
            ("OBS_OFFSET", OBS_OFFSET.to_string()),
            ("NCHAN", layout.nchan.to_string()),
            ("NDIM", NDIM.to_string()),
            ("ORDER", layout.order.to_string()),
            ("INSTRUMENT", INSTRUMENT.to_owned()),
            ("DM", format_float(config.dm)),
        ];
        Ok(Self {
            header_size: config.header_size,
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.to_owned(), v))
                .collect(),
        })
    }

    /// Parse the text portion of a header.
    ///
    /// The text ends at the first NUL byte or after HDR_SIZE bytes, whichever
    /// comes first.
    pub fn parse(bytes: &[u8]) -> Result<Self, DadaError> {
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        let header = Self::parse_text(&bytes[..end])?;
        if end > header.header_size {
            // No padding, the text runs straight into the samples
            return Self::parse_text(&bytes[..header.header_size]);
        }
        Ok(header)
    }

    fn parse_text(bytes: &[u8]) -> Result<Self, DadaError> {
        let text = String::from_utf8_lossy(bytes);
        let fields: Vec<(String, String)> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| match line.split_once(char::is_whitespace) {
                Some((key, value)) => (key.to_owned(), value.trim().to_owned()),
                None => (line.to_owned(), String::new()),
            })
            .collect();
        let mut header = Self {
            header_size: 0,
            fields,
        };
        header.header_size = header.get_parsed("HDR_SIZE")?;
        Ok(header)
    }

    /// Read just the header of the dada file at `path`
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DadaError> {
        let mut reader = BufReader::new(File::open(path)?);
        let mut bytes = vec![];
        (&mut reader)
            .take(DEFAULT_HEADER_SIZE as u64)
            .read_until(0, &mut bytes)?;
        if bytes.last() != Some(&0) {
            // Unterminated so far, read on to the end of the header but no further
            let header_size = Self::parse_text(&bytes)?.header_size;
            if header_size > bytes.len() {
                reader
                    .take((header_size - bytes.len()) as u64)
                    .read_until(0, &mut bytes)?;
            }
        }
        Self::parse(&bytes)
    }

    pub fn header_size(&self) -> usize {
        self.header_size
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_parsed<T: FromStr>(&self, key: &str) -> Result<T, DadaError> {
        let value = self
            .get(key)
            .ok_or_else(|| DadaError::MalformedHeader(format!("missing {key}")))?;
        value
            .parse()
            .map_err(|_| DadaError::MalformedHeader(format!("unparsable {key}: {value:?}")))
    }

    /// The header lines, without padding
    pub fn text(&self) -> String {
        let mut text = String::new();
        for (key, value) in &self.fields {
            // Line keys up on the third tab stop
            let tabs = 3usize.saturating_sub(key.len() / 8);
            text.push_str(key);
            text.push_str(&"\t".repeat(tabs));
            text.push_str(value);
            text.push('\n');
        }
        text
    }

    /// The full header block, NUL padded to exactly `header_size` bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, DadaError> {
        let mut bytes = self.text().into_bytes();
        if bytes.len() > self.header_size {
            return Err(DadaError::HeaderOverflow {
                needed: bytes.len(),
                header_size: self.header_size,
            });
        }
        bytes.resize(self.header_size, 0);
        Ok(bytes)
    }
}
