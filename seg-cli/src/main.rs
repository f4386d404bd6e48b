//! # hmmseg — linha de comando do segmentador HMM
//!
//! ```text
//! hmmseg train --corpus pku_training.utf8          # conta e salva o snapshot
//! hmmseg segment 我爱北京天安门                      # segmenta textos avulsos
//! hmmseg batch --input testset.txt --log log.txt   # segmenta um arquivo e anexa ao log
//! hmmseg stats                                     # mostra as distribuições
//! ```

mod logging;

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use seg_core::{accumulate, accumulate_parallel, corpus, persistence, Segmenter, State};

type CliResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Segmentação de palavras em chinês com HMM de 4 estados (B/M/E/S).
#[derive(Parser, Debug)]
#[command(name = "hmmseg", version, about)]
struct Cli {
    #[command(flatten)]
    logging: logging::LogArgs,

    /// Snapshot das contagens de treino.
    #[arg(long, env = "SEG_MODEL", default_value = "hmm_model.json", global = true)]
    model: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Conta as frequências de um corpus segmentado e salva o snapshot.
    Train {
        /// Corpus UTF-8, uma frase por linha, palavras separadas por espaço.
        #[arg(long)]
        corpus: PathBuf,

        /// Distribui a contagem entre threads (Rayon).
        #[arg(long)]
        parallel: bool,

        /// Número de threads do Rayon (padrão: número de CPUs).
        #[arg(long)]
        threads: Option<usize>,
    },

    /// Segmenta os textos informados e imprime uma linha por texto.
    Segment {
        /// Textos sem espaços.
        #[arg(required = true)]
        texts: Vec<String>,
    },

    /// Segmenta cada linha de um arquivo e anexa o resultado a um log.
    Batch {
        /// Arquivo com um texto por linha.
        #[arg(long)]
        input: PathBuf,

        /// Log de saída (aberto em modo append).
        #[arg(long, default_value = "log.txt")]
        log: PathBuf,

        /// Número de threads do Rayon (padrão: número de CPUs).
        #[arg(long)]
        threads: Option<usize>,
    },

    /// Mostra as distribuições inicial, de transição e as emissões mais prováveis.
    Stats {
        /// Quantos caracteres listar por estado.
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    cli.logging.setup_logging()?;

    match cli.command {
        Command::Train {
            corpus,
            parallel,
            threads,
        } => {
            configure_threads(threads)?;
            train(&corpus, &cli.model, parallel)
        }
        Command::Segment { texts } => {
            let segmenter = Segmenter::load(&cli.model)?;
            for text in &texts {
                println!("{}", segmenter.segment(text)?.join(" "));
            }
            Ok(())
        }
        Command::Batch {
            input,
            log,
            threads,
        } => {
            configure_threads(threads)?;
            let segmenter = Segmenter::load(&cli.model)?;
            let written = batch(&segmenter, &input, &log)?;
            eprintln!("{written} linhas segmentadas e anexadas a {}", log.display());
            Ok(())
        }
        Command::Stats { top } => stats(&cli.model, top),
    }
}

fn configure_threads(threads: Option<usize>) -> CliResult<()> {
    if let Some(n) = threads {
        rayon::ThreadPoolBuilder::new().num_threads(n).build_global()?;
    }
    Ok(())
}

fn train(corpus_path: &Path, model_path: &Path, parallel: bool) -> CliResult<()> {
    let lines = corpus::read_corpus(corpus_path)?;
    let counts = if parallel {
        accumulate_parallel(&lines)?
    } else {
        accumulate(&lines)?
    };
    persistence::save(&counts, model_path)?;

    eprintln!(
        "{} frases, {} caracteres → {}",
        counts.line_count(),
        counts.total_chars(),
        model_path.display()
    );
    Ok(())
}

/// Segmenta cada linha de `input` e anexa uma linha por texto a `log`, com as
/// palavras separadas por espaço (o mesmo formato do corpus de treino).
///
/// Linhas vazias viram linhas vazias no log, mantendo o alinhamento com a entrada.
fn batch(segmenter: &Segmenter, input: &Path, log: &Path) -> CliResult<usize> {
    let texts = corpus::read_corpus(input)?;
    let results = segmenter.segment_batch(&texts);

    let file = OpenOptions::new().create(true).append(true).open(log)?;
    let mut writer = BufWriter::new(file);

    for (i, result) in results.into_iter().enumerate() {
        match result {
            Ok(words) => writeln!(writer, "{}", words.join(" "))?,
            Err(e) => {
                tracing::warn!(line = i + 1, "linha não segmentada: {e}");
                writeln!(writer)?;
            }
        }
    }
    writer.flush()?;
    Ok(texts.len())
}

fn stats(model_path: &Path, top: usize) -> CliResult<()> {
    let counts = persistence::load(model_path)?;
    let segmenter = Segmenter::from_counts(&counts);
    let model = segmenter.model();

    println!("frases: {}  caracteres: {}", counts.line_count(), counts.total_chars());

    println!("\ninicial:");
    for s in State::ALL {
        println!("  {s}: {:.4}", model.initial(s));
    }

    println!("\ntransição (linha = anterior):");
    println!("     {}", State::ALL.map(|s| format!("{s:>8}")).join(""));
    for prev in State::ALL {
        let row = State::ALL.map(|curr| format!("{:>8.4}", model.transition(prev, curr)));
        println!("  {prev}: {}", row.join(""));
    }

    println!("\nemissão (top {top}):");
    for s in State::ALL {
        let items: Vec<String> = model
            .top_emissions(s, top)
            .into_iter()
            .map(|(c, p)| format!("{c}={p:.4}"))
            .collect();
        println!("  {s} ({} chars): {}", model.vocab_size(s), items.join(" "));
    }
    Ok(())
}
