//! Training Logger
//!
//! Records per-epoch metrics to CSV and mirrors each row to the `log` facade.
//!
//! ## CSV Format
//!
//! - `epoch`: Epoch number (1-based)
//! - `elapsed_seconds`: Time since the logger was created
//! - `learning_rate`: Step size in use
//! - `loss`: Mean cross-entropy over the batch, evaluated without dropout
//! - `error_norm`: Mean ‖target − output‖ over the batch
//!
//! ## Example
//!
//! ```rust,no_run
//! use deepdrop::TrainingLogger;
//!
//! let mut logger = TrainingLogger::new("training_log.csv")?;
//! logger.log(1, 0.01, 1.61, 0.89)?;
//! # Ok::<(), std::io::Error>(())
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::time::Instant;

const CSV_HEADER: &str = "epoch,elapsed_seconds,learning_rate,loss,error_norm";

/// Epoch metrics logger writing CSV rows to any `Write` sink
pub struct TrainingLogger<W: Write = BufWriter<File>> {
    sink: W,
    start_time: Instant,
    last_log_time: Instant,
}

impl TrainingLogger<BufWriter<File>> {
    /// Create a CSV file at `log_path` and write the header
    pub fn new(log_path: &str) -> std::io::Result<Self> {
        let file = File::create(log_path)?;
        Self::from_writer(BufWriter::new(file))
    }
}

impl<W: Write> TrainingLogger<W> {
    /// Wrap an arbitrary writer and write the header
    pub fn from_writer(mut sink: W) -> std::io::Result<Self> {
        writeln!(sink, "{}", CSV_HEADER)?;

        let now = Instant::now();
        Ok(Self {
            sink,
            start_time: now,
            last_log_time: now,
        })
    }

    /// Log one epoch
    pub fn log(
        &mut self,
        epoch: usize,
        learning_rate: f64,
        loss: f64,
        error_norm: f64,
    ) -> std::io::Result<()> {
        let elapsed = self.start_time.elapsed().as_secs_f64();

        writeln!(
            self.sink,
            "{},{:.3},{:.6},{:.6},{:.6}",
            epoch, elapsed, learning_rate, loss, error_norm
        )?;
        // Flush so a crash mid-training keeps every logged row
        self.sink.flush()?;

        let epoch_time = self.last_log_time.elapsed().as_secs_f64();
        log::info!(
            "Epoch {:5} | Time: {:7.2}s (+{:.2}s) | LR: {:.4} | Loss: {:.6} | Error: {:.6}",
            epoch,
            elapsed,
            epoch_time,
            learning_rate,
            loss,
            error_norm
        );

        self.last_log_time = Instant::now();
        Ok(())
    }

    /// Consume the logger and return the underlying writer
    pub fn into_inner(self) -> W {
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_header_and_rows() {
        let mut logger = TrainingLogger::from_writer(Vec::<u8>::new()).unwrap();
        logger.log(1, 0.01, 1.5, 0.75).unwrap();
        logger.log(2, 0.01, 1.25, 0.5).unwrap();

        let text = String::from_utf8(logger.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER);

        let fields: Vec<&str> = lines[1].split(',').collect();
        assert_eq!(fields.len(), 5);
        assert_eq!(fields[0], "1");
        assert_eq!(fields[2], "0.010000");
        assert_eq!(fields[3], "1.500000");
        assert_eq!(fields[4], "0.750000");
        assert!(lines[2].starts_with("2,"));
    }
}
