use std::fmt::Display;
use std::fs::File;
use std::io::{
    copy,
    Seek,
    SeekFrom,
    Write,
};
use std::str::FromStr;

use polars::io::mmap::MmapBytesReader;
use tempfile::tempfile;

/// Compression codecs recognized for report input and output files.
///
/// Each codec maps to a fixed file-name suffix appended to the written
/// report. An unrecognized codec tag is a configuration error raised by
/// [`Compression::from_str`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "console", derive(clap::ValueEnum))]
pub enum Compression {
    #[default]
    None,
    Gzip,
    Zip,
    Bz2,
    Xz,
}

impl Compression {
    pub fn name(&self) -> &str {
        match self {
            Compression::None => "none",
            Compression::Gzip => "gzip",
            Compression::Zip => "zip",
            Compression::Bz2 => "bz2",
            Compression::Xz => "xz",
        }
    }

    /// File-name suffix for this codec, including the leading dot.
    /// No codec means no suffix.
    pub fn extension(&self) -> &str {
        match self {
            Compression::None => "",
            Compression::Gzip => ".gz",
            Compression::Zip => ".zip",
            Compression::Bz2 => ".bz2",
            Compression::Xz => ".xz",
        }
    }

    /// Inflates a compressed input file into a seekable temporary file so
    /// the CSV reader can operate on plain bytes.
    pub fn get_decoder(
        &self,
        handle: File,
    ) -> anyhow::Result<Box<dyn MmapBytesReader>> {
        let mut temp_file = tempfile()?;

        match self {
            Compression::Gzip => {
                let mut decoder = flate2::read::GzDecoder::new(handle);
                copy(&mut decoder, &mut temp_file)?;
            },
            Compression::Bz2 => {
                let mut decoder = bzip2::read::BzDecoder::new(handle);
                copy(&mut decoder, &mut temp_file)?;
            },
            Compression::Xz => {
                let mut decoder = xz2::read::XzDecoder::new(handle);
                copy(&mut decoder, &mut temp_file)?;
            },
            Compression::Zip => {
                let mut archive = zip::ZipArchive::new(handle)?;
                if archive.len() > 0 {
                    let mut file_in_zip = archive.by_index(0)?;
                    copy(&mut file_in_zip, &mut temp_file)?;
                }
            },
            Compression::None => {
                return Ok(Box::new(handle));
            },
        }

        temp_file.seek(SeekFrom::Start(0))?;

        Ok(Box::new(temp_file))
    }

    /// Wraps a sink into the codec's encoder. `entry_name` names the single
    /// archive member for the zip codec and is ignored by the stream codecs.
    pub fn get_encoder<W: Write + Seek + 'static>(
        &self,
        handle: W,
        compression_level: u32,
        entry_name: &str,
    ) -> anyhow::Result<Box<dyn Write>> {
        let encoder: Box<dyn Write> = match self {
            Compression::Gzip => {
                Box::new(flate2::write::GzEncoder::new(
                    handle,
                    flate2::Compression::new(compression_level),
                ))
            },
            Compression::Bz2 => {
                Box::new(bzip2::write::BzEncoder::new(
                    handle,
                    bzip2::Compression::new(compression_level),
                ))
            },
            Compression::Xz => {
                Box::new(xz2::write::XzEncoder::new(handle, compression_level))
            },
            Compression::Zip => {
                let mut writer = zip::write::ZipWriter::new(handle);
                writer.start_file(
                    entry_name,
                    zip::write::SimpleFileOptions::default(),
                )?;
                Box::new(writer)
            },
            Compression::None => Box::new(handle),
        };
        Ok(encoder)
    }
}

impl Display for Compression {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Compression {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Compression::None),
            "gzip" => Ok(Compression::Gzip),
            "zip" => Ok(Compression::Zip),
            "bz2" => Ok(Compression::Bz2),
            "xz" => Ok(Compression::Xz),
            other => {
                Err(anyhow::anyhow!(
                    "unrecognized compression type '{}', only valid types \
                     are: \"gzip\", \"zip\", \"bz2\", \"xz\"",
                    other
                ))
            },
        }
    }
}
