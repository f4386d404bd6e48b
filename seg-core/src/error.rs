//! # Erros do Segmentador
//!
//! Apenas falhas reais viram erro. Probabilidades ausentes (pares estado/caractere
//! nunca vistos) valem 0 e caminhos de estados mal formados são absorvidos pelo
//! reconstrutor de segmentos, portanto nenhum dos dois aparece aqui.

use std::path::PathBuf;

/// Erros das operações do `seg-core`.
#[derive(Debug, thiserror::Error)]
pub enum SegError {
    /// Entrada inválida: palavra de tamanho zero ou texto vazio para decodificar.
    #[error("entrada inválida: {0}")]
    InvalidInput(String),

    /// Falha de I/O ao ler ou gravar um snapshot de parâmetros.
    #[error("falha de I/O no snapshot {}: {source}", .path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// O snapshot existe mas não pôde ser (des)serializado.
    #[error("snapshot ilegível em {}: {source}", .path.display())]
    Snapshot {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// O snapshot foi lido, mas as contagens violam os invariantes do modelo.
    #[error("snapshot corrompido em {}: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },

    /// Falha de I/O ao ler o corpus de treino.
    #[error("falha ao ler o corpus: {0}")]
    Corpus(#[from] std::io::Error),
}

/// Resultado padrão das operações do `seg-core`.
pub type SegResult<T> = Result<T, SegError>;
