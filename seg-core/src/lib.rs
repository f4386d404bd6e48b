//! # seg-core — Segmentação de Palavras em Chinês com HMM
//!
//! Este crate implementa um segmentador de palavras para escritas sem espaços
//! (como o chinês) usando um **Hidden Markov Model** de 4 estados sobre
//! caracteres individuais. Foi projetado para ser didático e modular.
//!
//! ## Arquitetura do Sistema
//!
//! O sistema segue uma arquitetura de pipeline linear:
//!
//! 1.  **Rotulagem** ([`label`]): cada palavra do corpus vira uma sequência B/M/E/S.
//! 2.  **Contagem** ([`counts`]): frequências de estados, inícios, transições e emissões.
//! 3.  **Normalização** ([`hmm`]): contagens viram probabilidades (modelo imutável).
//! 4.  **Decodificação** ([`viterbi`]): caminho de estados mais provável para um texto novo.
//! 5.  **Reconstrução** ([`segment`]): caminho de estados vira lista de palavras.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use seg_core::Segmenter;
//!
//! // 1. Treina sobre um corpus já segmentado (palavras separadas por espaço)
//! let segmenter = Segmenter::train(["他 说 我 爱 北京", "我 爱 北京"]).unwrap();
//!
//! // 2. Segmenta um texto sem espaços
//! let words = segmenter.segment("我爱北京").unwrap();
//! assert_eq!(words, vec!["我", "爱", "北京"]);
//! ```
//!
//! ## Módulos Principais
//!
//! - [`pipeline`]: Orquestrador que conecta normalização, Viterbi e reconstrução.
//! - [`corpus`]: Leitura do corpus de treino e corpus de demonstração.
//! - [`persistence`]: Snapshot atômico das contagens em disco.

pub mod corpus;
pub mod counts;
pub mod error;
pub mod hmm;
pub mod label;
pub mod persistence;
pub mod pipeline;
pub mod segment;
pub mod state;
pub mod viterbi;

pub use counts::{accumulate, accumulate_parallel, Counts};
pub use error::{SegError, SegResult};
pub use hmm::ProbabilityModel;
pub use pipeline::{PipelineEvent, Segmentation, Segmenter};
pub use state::State;
