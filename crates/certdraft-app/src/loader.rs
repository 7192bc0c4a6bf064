//! Background image loading off the editor thread.
//!
//! A worker thread reads the file, wraps it as a data URI and decodes it.
//! Results come back over a channel tagged with the canvas they were
//! requested for; the editor drops any that arrive for a replaced canvas.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use certdraft_core::canvas::CanvasToken;
use certdraft_core::layers::{ImageError, encode_data_uri};
use certdraft_core::pending::{BackgroundRequest, DecodedBackground};

struct Job {
    token: CanvasToken,
    path: PathBuf,
}

/// Worker that turns image files into decoded backgrounds.
pub struct BackgroundLoader {
    jobs: Option<Sender<Job>>,
    results: Receiver<DecodedBackground>,
    worker: Option<JoinHandle<()>>,
    pending: usize,
    /// Results loaded on the caller's thread when the worker is unavailable.
    inline: Vec<DecodedBackground>,
}

impl BackgroundLoader {
    pub fn new() -> Self {
        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let (result_tx, result_rx) = mpsc::channel();
        let worker = thread::Builder::new()
            .name("background-loader".into())
            .spawn(move || {
                for job in job_rx {
                    let decoded = load(job);
                    if result_tx.send(decoded).is_err() {
                        break;
                    }
                }
                log::debug!("Background loader stopped");
            });
        let worker = match worker {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::error!("Failed to start background loader: {}", e);
                None
            }
        };
        Self {
            jobs: Some(job_tx),
            results: result_rx,
            worker,
            pending: 0,
            inline: Vec::new(),
        }
    }

    /// Queue an image file for the canvas identified by `token`.
    pub fn submit(&mut self, token: CanvasToken, path: PathBuf) {
        log::debug!("Queued background {:?} for canvas {}", path, token);
        let job = Job { token, path };
        let sent = match &self.jobs {
            Some(tx) if self.worker.is_some() => tx.send(job).map_err(|e| e.0),
            _ => Err(job),
        };
        match sent {
            Ok(()) => self.pending += 1,
            Err(job) => {
                // No worker: load inline so the request still completes.
                log::warn!("Background loader unavailable, loading {:?} inline", job.path);
                self.inline.push(load(job));
            }
        }
    }

    /// Requests submitted but not yet collected.
    pub fn pending(&self) -> usize {
        self.pending + self.inline.len()
    }

    /// Collect finished results without blocking.
    pub fn poll(&mut self) -> Vec<DecodedBackground> {
        let mut done = std::mem::take(&mut self.inline);
        while self.pending > 0 {
            match self.results.try_recv() {
                Ok(decoded) => {
                    self.pending -= 1;
                    done.push(decoded);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    log::error!(
                        "Background loader exited with {} request(s) outstanding",
                        self.pending
                    );
                    self.pending = 0;
                    break;
                }
            }
        }
        done
    }

    /// Block until every submitted request has finished.
    pub fn wait(&mut self) -> Vec<DecodedBackground> {
        let mut done = std::mem::take(&mut self.inline);
        while self.pending > 0 {
            match self.results.recv() {
                Ok(decoded) => {
                    self.pending -= 1;
                    done.push(decoded);
                }
                Err(_) => {
                    log::error!(
                        "Background loader exited with {} request(s) outstanding",
                        self.pending
                    );
                    self.pending = 0;
                }
            }
        }
        done
    }
}

impl Default for BackgroundLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for BackgroundLoader {
    fn drop(&mut self) {
        // Closing the job channel ends the worker loop.
        self.jobs.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("Background loader panicked");
            }
        }
    }
}

fn load(job: Job) -> DecodedBackground {
    match std::fs::read(&job.path) {
        Ok(bytes) => BackgroundRequest::new(job.token, encode_data_uri(&bytes)).decode(),
        Err(e) => {
            log::warn!("Failed to read {:?}: {}", job.path, e);
            DecodedBackground::failed(job.token, ImageError::Read(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use certdraft_core::canvas::Canvas;
    use certdraft_core::format::Format;
    use image::{Rgba, RgbaImage};

    fn write_png(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("bg.png");
        RgbaImage::from_pixel(4, 2, Rgba([1, 2, 3, 255])).save(&path).unwrap();
        path
    }

    #[test]
    fn test_loads_file_on_worker() {
        let dir = tempfile::tempdir().unwrap();
        let canvas = Canvas::new(Format::Square, Canvas::DEFAULT_BACKGROUND);
        let mut loader = BackgroundLoader::new();
        loader.submit(canvas.token(), write_png(&dir));
        assert_eq!(loader.pending(), 1);

        let done = loader.wait();
        assert_eq!(loader.pending(), 0);
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].token, canvas.token());
        let image = done[0].result.as_ref().unwrap();
        assert_eq!(image.pixels.dimensions(), (4, 2));
    }

    #[test]
    fn test_missing_file_reports_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let canvas = Canvas::new(Format::Square, Canvas::DEFAULT_BACKGROUND);
        let mut loader = BackgroundLoader::new();
        loader.submit(canvas.token(), dir.path().join("nope.png"));
        let done = loader.wait();
        assert!(matches!(done[0].result, Err(ImageError::Read(_))));
    }

    #[test]
    fn test_poll_eventually_collects() {
        let dir = tempfile::tempdir().unwrap();
        let canvas = Canvas::new(Format::Square, Canvas::DEFAULT_BACKGROUND);
        let mut loader = BackgroundLoader::new();
        loader.submit(canvas.token(), write_png(&dir));
        let mut collected = Vec::new();
        while collected.is_empty() {
            collected = loader.poll();
            thread::yield_now();
        }
        assert_eq!(collected.len(), 1);
        assert!(loader.poll().is_empty());
    }
}
