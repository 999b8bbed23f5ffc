use byteorder::{ByteOrder, LittleEndian};
use log::{debug, info};
use rusty_trace::config::DataConfig;
use rusty_trace::{Result, TraceError};
use std::fs;
use std::path::Path;

/// Read one series from disk. The series id is the file stem.
///
/// Supported formats, chosen by extension:
/// * `.txt` / `.csv`: one value per line, `nan` or an empty line is a missing value
/// * `.i16`: little-endian int16 ADC samples, calibrated to pA when `data.in_pa` is set
/// * `.f64`: little-endian float64 samples
pub fn load_file(path: &Path, data: &DataConfig) -> Result<(String, Vec<f64>)> {
    let id = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| TraceError::InvalidInput(format!("no file name in {}", path.display())))?;

    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let values = match extension.as_str() {
        "txt" | "csv" => parse_text(&fs::read_to_string(path)?, path)?,
        "i16" => decode_i16(&fs::read(path)?, data, path)?,
        "f64" => decode_f64(&fs::read(path)?, path)?,
        other => {
            return Err(TraceError::InvalidInput(format!(
                "unsupported file type '.{}' for {}",
                other,
                path.display()
            )));
        }
    };

    info!("Read {} samples from {}", values.len(), path.display());
    Ok((id, values))
}

fn parse_text(contents: &str, path: &Path) -> Result<Vec<f64>> {
    contents
        .lines()
        .enumerate()
        .map(|(line_no, line)| {
            let field = line.trim();
            if field.is_empty() || field.eq_ignore_ascii_case("nan") {
                return Ok(f64::NAN);
            }
            field.parse::<f64>().map_err(|_| {
                TraceError::InvalidInput(format!(
                    "{}:{}: '{}' is not a number",
                    path.display(),
                    line_no + 1,
                    field
                ))
            })
        })
        .collect()
}

fn decode_i16(bytes: &[u8], data: &DataConfig, path: &Path) -> Result<Vec<f64>> {
    check_record_size(bytes, 2, path)?;
    let mut adc = vec![0i16; bytes.len() / 2];
    LittleEndian::read_i16_into(bytes, &mut adc);

    if data.in_pa {
        debug!(
            "Calibrating {} to pA (offset {}, scale {})",
            path.display(),
            data.calibration_offset,
            data.calibration_scale
        );
        Ok(adc
            .iter()
            .map(|&v| (v as f64 + data.calibration_offset) * data.calibration_scale)
            .collect())
    } else {
        Ok(adc.iter().map(|&v| v as f64).collect())
    }
}

fn decode_f64(bytes: &[u8], path: &Path) -> Result<Vec<f64>> {
    check_record_size(bytes, 8, path)?;
    let mut values = vec![0.0; bytes.len() / 8];
    LittleEndian::read_f64_into(bytes, &mut values);
    Ok(values)
}

fn check_record_size(bytes: &[u8], size: usize, path: &Path) -> Result<()> {
    if bytes.len() % size != 0 {
        return Err(TraceError::InvalidInput(format!(
            "{} has {} bytes, not a multiple of {}",
            path.display(),
            bytes.len(),
            size
        )));
    }
    Ok(())
}
