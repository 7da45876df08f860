use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("jsp-gui: eframe: {}", .0)]
    Eframe(#[from] eframe::Error),
}
