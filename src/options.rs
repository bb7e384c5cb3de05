use std::path::PathBuf;

use gumdrop::Options;

#[derive(Debug, Options)]
pub struct AppOptions {
    #[options(help = "print this help message")]
    pub help: bool,

    #[options(free, required, help = "path to the ROM to run")]
    pub rom: PathBuf,

    #[options(help = "the amount of frames to emulate", default = "600")]
    pub frames: u64,

    #[options(help = "directory the framebuffer snapshot is written to", default = "testing_frames/new")]
    pub output_dir: PathBuf,

    #[options(help = "path to saved external RAM to restore into the cartridge")]
    pub saved_ram: Option<PathBuf>,

    #[options(help = "also write a JSON run report next to the snapshot")]
    pub report: bool,

    #[options(help = "enable verbose logging")]
    pub verbose: bool,
}
