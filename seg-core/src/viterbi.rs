//! # Algoritmo de Viterbi — Decodificação da Sequência de Estados
//!
//! O algoritmo de Viterbi é um método de **programação dinâmica** que encontra
//! a sequência de estados B/M/E/S mais provável para um texto.
//!
//! ## Intuição
//!
//! Uma busca exaustiva teria complexidade `O(4^N)` para N caracteres. O Viterbi
//! explora que o **melhor caminho até o caractere t no estado s** depende apenas
//! do **melhor caminho até t-1 em algum estado anterior** → `O(N × 4²)`.
//!
//! ## Algoritmo
//!
//! ```text
//! Inicialização: score[0][s] = initial[s] · emission[s](x_0)
//!
//! Recursão: score[t][s] = max_{s'} score[t-1][s'] · transition[s'][s] · emission[s](x_t)
//!
//! Backtracking: reconstrói o caminho ótimo de trás pra frente
//! ```
//!
//! Os produtos são calculados nesta ordem exata, da esquerda para a direita, e o
//! máximo é tomado sobre pares `(score, estado)` com a ordem de desempate de
//! [`State`]. Isso torna a saída reprodutível bit a bit, inclusive quando toda a
//! coluna vale 0 (caractere nunca visto com modelo esparso), situação que **não**
//! é erro.

use serde::{Deserialize, Serialize};

use crate::error::{SegError, SegResult};
use crate::hmm::ProbabilityModel;
use crate::state::{cmp_candidates, State, N_STATES};

/// Estado do Viterbi em um instante (para visualização passo a passo)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViterbiStep {
    /// Índice do caractere sendo processado
    pub char_index: usize,
    /// O caractere observado
    pub character: char,
    /// Scores acumulados para cada estado neste passo (ordem de [`State::ALL`])
    pub scores: Vec<StateScore>,
    /// O estado com maior score neste passo (com desempate)
    pub best_state: State,
    /// Score do melhor caminho até aqui
    pub best_score: f64,
}

/// Score de um estado individual no Viterbi
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateScore {
    pub state: State,
    /// Score acumulado até este passo terminando neste estado
    pub score: f64,
    /// Estado anterior que gerou este score ótimo (`None` no primeiro caractere)
    pub best_prev: Option<State>,
    /// Probabilidade de emissão do caractere neste estado
    pub emission: f64,
    /// Probabilidade de transição do melhor anterior para este estado
    /// (no primeiro caractere, a probabilidade inicial)
    pub transition: f64,
}

/// Resultado completo do Viterbi
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViterbiResult {
    /// Sequência de estados mais provável (um por caractere)
    pub path: Vec<State>,
    /// Probabilidade do melhor caminho (pode ser 0 em modelos esparsos)
    pub best_score: f64,
    /// Tabela completa de scores (vazia se o trace não foi pedido)
    pub steps: Vec<ViterbiStep>,
}

/// Decodifica o caminho de estados mais provável para `text`.
///
/// Texto vazio é rejeitado com [`SegError::InvalidInput`].
pub fn decode(text: &str, model: &ProbabilityModel) -> SegResult<Vec<State>> {
    let chars: Vec<char> = text.chars().collect();
    Ok(viterbi_decode(&chars, model, false)?.path)
}

/// Como [`decode`], mas devolve também a tabela de scores de cada passo.
pub fn decode_with_trace(text: &str, model: &ProbabilityModel) -> SegResult<ViterbiResult> {
    let chars: Vec<char> = text.chars().collect();
    viterbi_decode(&chars, model, true)
}

/// Executa o algoritmo de Viterbi sobre uma sequência de caracteres.
pub fn viterbi_decode(
    chars: &[char],
    model: &ProbabilityModel,
    trace: bool,
) -> SegResult<ViterbiResult> {
    if chars.is_empty() {
        return Err(SegError::InvalidInput(
            "texto vazio não pode ser decodificado".to_string(),
        ));
    }

    let n_chars = chars.len();
    tracing::debug!(chars = n_chars, "decodificando");

    // score[s] = melhor score acumulado terminando no estado s no caractere atual
    let mut score = [0.0f64; N_STATES];
    // backptr[t][s] = estado anterior que maximiza score[t][s]
    let mut backptr: Vec<[State; N_STATES]> = Vec::with_capacity(n_chars);
    let mut steps: Vec<ViterbiStep> = Vec::with_capacity(if trace { n_chars } else { 0 });

    // === Inicialização (caractere 0) ===
    let mut step_scores = Vec::with_capacity(N_STATES);
    for state in State::ALL {
        let init = model.initial(state);
        let emit = model.emission(state, chars[0]);
        score[state.index()] = init * emit;
        if trace {
            step_scores.push(StateScore {
                state,
                score: score[state.index()],
                best_prev: None,
                emission: emit,
                transition: init,
            });
        }
    }
    backptr.push(State::ALL);
    if trace {
        steps.push(make_step(0, chars[0], &score, step_scores));
    }

    // === Recursão (caracteres 1..N-1) ===
    for (t, &c) in chars.iter().enumerate().skip(1) {
        let mut new_score = [0.0f64; N_STATES];
        let mut back = State::ALL;
        let mut step_scores = Vec::with_capacity(N_STATES);

        for state in State::ALL {
            let emit = model.emission(state, c);

            let (best, prev) = State::ALL
                .iter()
                .map(|&prev| (score[prev.index()] * model.transition(prev, state) * emit, prev))
                .reduce(|best, cand| {
                    if cmp_candidates(cand, best).is_gt() {
                        cand
                    } else {
                        best
                    }
                })
                .unwrap_or((0.0, State::Single));

            new_score[state.index()] = best;
            back[state.index()] = prev;

            if trace {
                step_scores.push(StateScore {
                    state,
                    score: best,
                    best_prev: Some(prev),
                    emission: emit,
                    transition: model.transition(prev, state),
                });
            }
        }

        score = new_score;
        backptr.push(back);
        if trace {
            steps.push(make_step(t, c, &score, step_scores));
        }
    }

    // === Terminação + Backtracking ===
    let (best_score, mut last) = best_in_column(&score);
    let mut path = vec![last; n_chars];
    for t in (1..n_chars).rev() {
        last = backptr[t][last.index()];
        path[t - 1] = last;
    }

    Ok(ViterbiResult {
        path,
        best_score,
        steps,
    })
}

fn make_step(
    char_index: usize,
    character: char,
    score: &[f64; N_STATES],
    scores: Vec<StateScore>,
) -> ViterbiStep {
    let (best_score, best_state) = best_in_column(score);
    ViterbiStep {
        char_index,
        character,
        scores,
        best_state,
        best_score,
    }
}

/// Retorna (score, estado) do máximo de uma coluna, com desempate pela ordem dos estados
fn best_in_column(scores: &[f64; N_STATES]) -> (f64, State) {
    State::ALL
        .iter()
        .map(|&s| (scores[s.index()], s))
        .max_by(|a, b| cmp_candidates(*a, *b))
        .unwrap_or((0.0, State::Single))
}

#[cfg(test)]
mod tests {
    use super::*;
    use State::*;

    #[test]
    fn test_worked_example_all_zero_resolves_to_single() {
        let model = ProbabilityModel::from_corpus(["我 爱 北京"]).unwrap();
        let result = decode_with_trace("我爱", &model).unwrap();

        // emission[S]['我'] = 0 e os outros iniciais são 0 → coluna zerada
        assert!(result.steps[0].scores.iter().all(|s| s.score == 0.0));
        assert_eq!(result.path, vec![Single, Single]);
        assert_eq!(result.best_score, 0.0);
    }

    #[test]
    fn test_decodes_trained_sentence() {
        let model = ProbabilityModel::from_corpus(["他 说 我 爱 北京", "我 爱 北京"]).unwrap();
        let path = decode("我爱北京", &model).unwrap();
        assert_eq!(path, vec![Single, Single, Begin, End]);
    }

    #[test]
    fn test_empty_text_is_rejected() {
        let model = ProbabilityModel::from_corpus(["我 爱 北京"]).unwrap();
        assert!(matches!(decode("", &model), Err(SegError::InvalidInput(_))));
    }

    #[test]
    fn test_unseen_text_is_fully_degenerate() {
        let model = ProbabilityModel::from_corpus(crate::corpus::demo_corpus()).unwrap();
        // Caracteres latinos nunca aparecem no corpus de demonstração
        let result = decode_with_trace("xyzw", &model).unwrap();

        for step in &result.steps {
            assert!(step.scores.iter().all(|s| s.score == 0.0));
            assert_eq!(step.best_state, Single);
        }
        assert_eq!(result.path, vec![Single; 4]);
    }

    #[test]
    fn test_decode_is_deterministic() {
        let model = ProbabilityModel::from_corpus(crate::corpus::demo_corpus()).unwrap();
        let text = "今天天气很好我们去北京大学";
        let first = decode_with_trace(text, &model).unwrap();
        for _ in 0..10 {
            let again = decode_with_trace(text, &model).unwrap();
            assert_eq!(first.path, again.path);
            assert_eq!(first.best_score.to_bits(), again.best_score.to_bits());
        }
    }

    #[test]
    fn test_trace_matches_plain_decode() {
        let model = ProbabilityModel::from_corpus(crate::corpus::demo_corpus()).unwrap();
        let text = "我们在学习中文";
        let traced = decode_with_trace(text, &model).unwrap();
        assert_eq!(traced.path, decode(text, &model).unwrap());
        assert_eq!(traced.steps.len(), text.chars().count());
        assert_eq!(traced.steps[3].character, '学');
    }

    #[test]
    fn test_single_char_text() {
        let model = ProbabilityModel::from_corpus(["他 说 我 爱 北京"]).unwrap();
        // 他 só aparece no início → emissão 0 → coluna zerada → Single
        assert_eq!(decode("他", &model).unwrap(), vec![Single]);
    }
}
