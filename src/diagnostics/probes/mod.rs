//! Built-in probe adapters.
//!
//! Each adapter wraps one host data source. Paths and tool names come in
//! through [`ProbeSettings`]; nothing here reads the environment.

pub mod command;
pub mod disk;
pub mod gpu;
pub mod procfs;

use std::path::PathBuf;
use std::sync::Arc;

use super::probe::Probe;

pub use command::CommandProbe;
pub use disk::disk_probe;
pub use gpu::gpu_probe;
pub use procfs::{LoadProbe, MemoryProbe};

/// Names accepted by [`builtin`].
pub const BUILTIN_PROBES: &[&str] = &["gpu", "memory", "disk", "load"];

/// Inputs for the built-in probes.
#[derive(Clone, Debug)]
pub struct ProbeSettings {
    pub proc_root: PathBuf,
    pub disk_mounts: Vec<String>,
    pub nvidia_smi: String,
    pub df: String,
    /// Logical CPUs used to normalize load averages.
    pub cpus: usize,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            proc_root: PathBuf::from("/proc"),
            disk_mounts: vec!["/".to_string()],
            nvidia_smi: "nvidia-smi".to_string(),
            df: "df".to_string(),
            cpus: num_cpus::get(),
        }
    }
}

/// Construct a built-in probe by name.
pub fn builtin(name: &str, settings: &ProbeSettings) -> Option<Arc<dyn Probe>> {
    let probe: Arc<dyn Probe> = match name {
        "gpu" => Arc::new(gpu_probe(&settings.nvidia_smi)),
        "memory" => Arc::new(MemoryProbe::new(&settings.proc_root)),
        "disk" => Arc::new(disk_probe(&settings.df, &settings.disk_mounts)),
        "load" => Arc::new(LoadProbe::new(&settings.proc_root, settings.cpus)),
        _ => return None,
    };
    Some(probe)
}
