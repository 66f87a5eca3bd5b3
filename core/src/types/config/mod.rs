mod shell;

pub use shell::{FormFactor, ResultsConfig, SearchConfig, ShellConfig, TtlConfig};
