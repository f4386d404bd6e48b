use tracing_subscriber::EnvFilter;

/// Logging setup arg group.
#[derive(clap::Args, Debug)]
pub struct LogArgs {
    /// Silencia as mensagens de log.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Aumenta o detalhamento (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

impl LogArgs {
    /// Instala o subscriber do `tracing`. `RUST_LOG`, se definido, tem precedência.
    pub fn setup_logging(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.level()));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()?;
        Ok(())
    }

    /// Nível padrão do filtro: `info`, `off` com `-q`, `debug`/`trace` com `-v`/`-vv`.
    fn level(&self) -> &'static str {
        if self.quiet {
            return "off";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
