// Command line surface. Every required flag must be present before anything
// else starts; clap prints the usage and exits non-zero otherwise.

use clap::Parser;

/// Segment used when `--name` is given empty.
pub const DEFAULT_SEGMENT: &str = "/cam0";

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(
    name = "spline-overlay",
    about = "Overlays a guidance spline and the current aim point onto shared-memory video frames.",
    after_help = "Example: spline-overlay --cid=111 --name=cam0 --width=640 --height=480"
)]
pub struct Config {
    /// Message bus session (conference id)
    #[arg(long)]
    pub cid: u16,

    /// Name of the shared memory segment holding the frames
    #[arg(long)]
    pub name: String,

    /// Width of a frame in pixels
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub width: u32,

    /// Height of a frame in pixels
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub height: u32,

    /// Display the annotated frames in a window
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub verbose: bool,
}

impl Config {
    /// Segment name with the empty-name fallback applied.
    pub fn segment_name(&self) -> &str {
        if self.name.is_empty() {
            DEFAULT_SEGMENT
        } else {
            &self.name
        }
    }
}
