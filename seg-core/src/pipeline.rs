//! # Pipeline de Segmentação — Orquestrador com Eventos Observáveis
//!
//! O [`Segmenter`] compõe as três etapas da inferência:
//!
//! 1. **Normalização** ([`ProbabilityModel::normalize`]), feita uma única vez na construção.
//! 2. **Decodificação** ([`viterbi`](crate::viterbi)) do texto em estados B/M/E/S.
//! 3. **Reconstrução** ([`segment`](crate::segment)) das palavras a partir dos estados.
//!
//! Assim como no modo streaming do servidor web, o pipeline pode emitir eventos
//! em cada passo via um canal Rust (`mpsc`).

use std::path::Path;
use std::sync::{mpsc, Arc};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::counts::{accumulate, Counts};
use crate::error::SegResult;
use crate::hmm::ProbabilityModel;
use crate::persistence;
use crate::segment::reconstruct_chars;
use crate::state::State;
use crate::viterbi::{viterbi_decode, ViterbiStep};

/// Eventos emitidos pelo pipeline durante a segmentação.
///
/// Permitem que a UI visualize o Viterbi passo a passo.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PipelineEvent {
    /// **Passo 1**: Texto recebido e separado em caracteres.
    Started { text: String, total_chars: usize },
    /// **Passo 2**: Uma coluna do Viterbi foi calculada.
    ViterbiStep { step: ViterbiStep },
    /// **Passo 3**: Estado final atribuído a um caractere (após o backtracking).
    StateAssigned {
        char_index: usize,
        character: char,
        state: State,
    },
    /// **Conclusão**: Palavras reconstruídas.
    Done {
        words: Vec<String>,
        states: Vec<State>,
        best_score: f64,
        processing_ms: u64,
    },
    /// **Falha**: Texto inválido (ex: vazio).
    Error { message: String },
}

/// Resultado detalhado de uma segmentação.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segmentation {
    /// Palavras, na ordem do texto. A concatenação é o texto original.
    pub words: Vec<String>,
    /// Caminho de estados decodificado (um por caractere).
    pub states: Vec<State>,
    /// Probabilidade do melhor caminho.
    pub best_score: f64,
}

/// O segmentador principal.
///
/// Guarda o modelo congelado num `Arc`: clonar um `Segmenter` é barato e todas
/// as cópias compartilham as mesmas distribuições, somente leitura.
#[derive(Debug, Clone)]
pub struct Segmenter {
    model: Arc<ProbabilityModel>,
}

impl Segmenter {
    pub fn new(model: ProbabilityModel) -> Self {
        Self {
            model: Arc::new(model),
        }
    }

    /// Normaliza as contagens e cria o segmentador.
    pub fn from_counts(counts: &Counts) -> Self {
        Self::new(ProbabilityModel::normalize(counts))
    }

    /// Treina sobre um corpus segmentado e cria o segmentador.
    pub fn train<I, S>(lines: I) -> SegResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self::from_counts(&accumulate(lines)?))
    }

    /// Carrega um snapshot de contagens salvo com [`persistence::save`].
    pub fn load(path: &Path) -> SegResult<Self> {
        Ok(Self::from_counts(&persistence::load(path)?))
    }

    /// Segmentador treinado no corpus de demonstração embutido.
    pub fn demo() -> SegResult<Self> {
        Self::train(crate::corpus::demo_corpus())
    }

    pub fn model(&self) -> &ProbabilityModel {
        &self.model
    }

    /// Segmenta `text` em palavras.
    ///
    /// Texto vazio é [`InvalidInput`](crate::error::SegError::InvalidInput).
    ///
    /// ```rust
    /// use seg_core::Segmenter;
    ///
    /// let segmenter = Segmenter::train(["他 说 我 爱 北京", "我 爱 北京"]).unwrap();
    /// assert_eq!(segmenter.segment("我爱北京").unwrap(), vec!["我", "爱", "北京"]);
    /// ```
    pub fn segment(&self, text: &str) -> SegResult<Vec<String>> {
        Ok(self.segment_detailed(text)?.words)
    }

    /// Segmenta e devolve também o caminho de estados e o score.
    pub fn segment_detailed(&self, text: &str) -> SegResult<Segmentation> {
        let chars: Vec<char> = text.chars().collect();
        let result = viterbi_decode(&chars, &self.model, false)?;
        let words = reconstruct_chars(&chars, &result.path);
        Ok(Segmentation {
            words,
            states: result.path,
            best_score: result.best_score,
        })
    }

    /// Segmenta vários textos em paralelo (Rayon). Cada texto é independente;
    /// a ordem da saída é a mesma da entrada.
    pub fn segment_batch<S>(&self, texts: &[S]) -> Vec<SegResult<Vec<String>>>
    where
        S: AsRef<str> + Sync,
    {
        texts.par_iter().map(|t| self.segment(t.as_ref())).collect()
    }

    /// Executa o pipeline enviando eventos de progresso em tempo real.
    ///
    /// # Fluxo de Eventos
    /// 1. `Started`: Texto recebido.
    /// 2. `ViterbiStep` (Loop): Uma coluna por caractere.
    /// 3. `StateAssigned` (Loop): Estado final de cada caractere.
    /// 4. `Done`: Palavras reconstruídas.
    ///
    /// Texto inválido gera `Started` seguido de `Error`.
    pub fn segment_streaming(&self, text: &str, tx: mpsc::Sender<PipelineEvent>) {
        let start = Instant::now();
        let chars: Vec<char> = text.chars().collect();

        let _ = tx.send(PipelineEvent::Started {
            text: text.to_string(),
            total_chars: chars.len(),
        });

        let result = match viterbi_decode(&chars, &self.model, true) {
            Ok(result) => result,
            Err(e) => {
                let _ = tx.send(PipelineEvent::Error {
                    message: e.to_string(),
                });
                return;
            }
        };

        for step in &result.steps {
            let _ = tx.send(PipelineEvent::ViterbiStep { step: step.clone() });
        }

        for (i, (&character, &state)) in chars.iter().zip(result.path.iter()).enumerate() {
            let _ = tx.send(PipelineEvent::StateAssigned {
                char_index: i,
                character,
                state,
            });
        }

        let words = reconstruct_chars(&chars, &result.path);
        let _ = tx.send(PipelineEvent::Done {
            words,
            states: result.path,
            best_score: result.best_score,
            processing_ms: start.elapsed().as_millis() as u64,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SegError;

    #[test]
    fn test_segment_basic() {
        let segmenter = Segmenter::train(["他 说 我 爱 北京", "我 爱 北京"]).unwrap();
        let words = segmenter.segment("我爱北京").unwrap();
        assert_eq!(words, vec!["我", "爱", "北京"]);
    }

    #[test]
    fn test_worked_example() {
        let segmenter = Segmenter::train(["我 爱 北京"]).unwrap();
        let seg = segmenter.segment_detailed("我爱").unwrap();
        assert_eq!(seg.words, vec!["我", "爱"]);
        assert_eq!(seg.states, vec![State::Single, State::Single]);
    }

    #[test]
    fn test_segment_empty() {
        let segmenter = Segmenter::demo().unwrap();
        assert!(matches!(segmenter.segment(""), Err(SegError::InvalidInput(_))));
    }

    #[test]
    fn test_segment_concatenates_to_text() {
        let segmenter = Segmenter::demo().unwrap();
        for (_, text) in crate::corpus::demo_texts() {
            let words = segmenter.segment(text).unwrap();
            assert_eq!(words.concat(), text);
        }
    }

    #[test]
    fn test_batch_matches_single() {
        let segmenter = Segmenter::demo().unwrap();
        let texts: Vec<&str> = crate::corpus::demo_texts().iter().map(|(_, t)| *t).collect();

        let batch = segmenter.segment_batch(&texts);
        assert_eq!(batch.len(), texts.len());
        for (text, result) in texts.iter().zip(batch) {
            assert_eq!(result.unwrap(), segmenter.segment(text).unwrap());
        }
    }

    #[test]
    fn test_batch_keeps_errors_in_place() {
        let segmenter = Segmenter::demo().unwrap();
        let results = segmenter.segment_batch(&["我爱北京", "", "天安门"]);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }

    #[test]
    fn test_pipeline_events_streaming() {
        let segmenter = Segmenter::demo().unwrap();
        let (tx, rx) = mpsc::channel();
        segmenter.segment_streaming("我爱北京天安门", tx);

        let events: Vec<PipelineEvent> = rx.try_iter().collect();
        assert!(
            matches!(&events[0], PipelineEvent::Started { total_chars: 7, .. }),
            "Primeiro evento deve ser Started"
        );

        let steps = events
            .iter()
            .filter(|e| matches!(e, PipelineEvent::ViterbiStep { .. }))
            .count();
        assert_eq!(steps, 7);

        match events.last().unwrap() {
            PipelineEvent::Done { words, states, .. } => {
                assert_eq!(words.concat(), "我爱北京天安门");
                assert_eq!(states.len(), 7);
            }
            other => panic!("Último evento deve ser Done, veio {other:?}"),
        }
    }

    #[test]
    fn test_pipeline_streaming_error() {
        let segmenter = Segmenter::demo().unwrap();
        let (tx, rx) = mpsc::channel();
        segmenter.segment_streaming("", tx);

        let events: Vec<PipelineEvent> = rx.try_iter().collect();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], PipelineEvent::Error { .. }));
    }

    #[test]
    fn test_clone_shares_model() {
        let a = Segmenter::demo().unwrap();
        let b = a.clone();
        assert!(Arc::ptr_eq(&a.model, &b.model));
    }
}
