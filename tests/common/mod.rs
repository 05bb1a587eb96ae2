use std::io::{Error, Write};
use tempfile::NamedTempFile;

pub const PAYMENTS_HEADER: &str = "payment,form,form_title,status,amount";
pub const EVENTS_HEADER: &str = "type,payment,old_status,new_status,page,message";

pub fn write_csv(header: &str, rows: &[&str]) -> Result<NamedTempFile, Error> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "{header}")?;
    for row in rows {
        writeln!(file, "{row}")?;
    }
    file.flush()?;
    Ok(file)
}

pub fn payments_csv(rows: &[&str]) -> NamedTempFile {
    write_csv(PAYMENTS_HEADER, rows).expect("Failed to write payments CSV")
}

pub fn events_csv(rows: &[&str]) -> NamedTempFile {
    write_csv(EVENTS_HEADER, rows).expect("Failed to write events CSV")
}
