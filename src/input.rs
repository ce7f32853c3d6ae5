//! Bounded producer/consumer feed from an input source into the run
//! generator (spec §4.5/§5/§9).

use crossbeam_channel::{bounded, Receiver};
use std::io::BufRead;
use std::thread::{self, JoinHandle};

/// Spawns a dedicated thread that reads lines from `source` and sends them
/// into a bounded channel. The channel closes when the source is exhausted
/// or on read error (the latter is logged by the caller via the joined
/// handle's result).
pub fn spawn_line_reader<R>(mut source: R, capacity: usize) -> (JoinHandle<std::io::Result<()>>, Receiver<String>)
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = bounded(capacity);
    let handle = thread::spawn(move || -> std::io::Result<()> {
        let mut line = String::new();
        loop {
            line.clear();
            let n = source.read_line(&mut line)?;
            if n == 0 {
                break;
            }
            if tx.send(line.clone()).is_err() {
                // consumer dropped its receiver; stop reading.
                break;
            }
        }
        Ok(())
    });
    (handle, rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn streams_lines_in_order() {
        let data = Cursor::new(b"1,a,b,c\n2,d,e,f\n".to_vec());
        let (handle, rx) = spawn_line_reader(data, 4);
        let lines: Vec<String> = rx.iter().collect();
        handle.join().unwrap().unwrap();
        assert_eq!(lines, vec!["1,a,b,c\n", "2,d,e,f\n"]);
    }

    #[test]
    fn empty_source_yields_no_lines() {
        let data = Cursor::new(Vec::new());
        let (handle, rx) = spawn_line_reader(data, 4);
        let lines: Vec<String> = rx.iter().collect();
        handle.join().unwrap().unwrap();
        assert!(lines.is_empty());
    }
}
