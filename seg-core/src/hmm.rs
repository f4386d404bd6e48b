//! # Hidden Markov Model (HMM) para Segmentação
//!
//! Implementação clássica de HMM onde:
//! - **Estados Ocultos**: posição do caractere na palavra (B, M, E, S)
//! - **Observações**: caracteres
//!
//! O modelo guarda três distribuições, obtidas dividindo as contagens de
//! [`Counts`](crate::counts::Counts):
//! 1. Probabilidade Inicial: P(estado_inicial) = `init_count / line_count`
//! 2. Probabilidade de Transição: P(atual | anterior) = `trans_count / state_count[anterior]`
//! 3. Probabilidade de Emissão: P(caractere | estado) = `emit_count / state_count[estado]`
//!
//! ## Sem suavização
//!
//! Eventos nunca vistos têm probabilidade **0**, não um valor suavizado. Isso é
//! política explícita: o Viterbi lida com colunas inteiras zeradas através da
//! regra de desempate (ver [`crate::state`]).
//!
//! Como as probabilidades são multiplicadas diretamente (e não somadas em
//! log-space), textos muito longos podem sofrer underflow para 0. O resultado
//! continua determinístico.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::counts::Counts;
use crate::state::{State, N_STATES};

/// Distribuições do HMM, congeladas após o treino.
///
/// O modelo é imutável: pode ser compartilhado via `Arc` entre quantas
/// decodificações simultâneas forem necessárias, sem sincronização.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityModel {
    /// P(y_0), indexado por [`State::index`].
    initial: [f64; N_STATES],
    /// P(y_i | y_{i-1}): `transition[prev][curr]`.
    transition: [[f64; N_STATES]; N_STATES],
    /// P(x_i | y_i): só os caracteres observados sob cada estado.
    emission: [HashMap<char, f64>; N_STATES],
}

impl ProbabilityModel {
    /// Normaliza as contagens em probabilidades.
    ///
    /// Linhas de estados que nunca apareceram (`state_count == 0`) ficam
    /// inteiramente zeradas, assim como o vetor inicial quando `line_count == 0`.
    pub fn normalize(counts: &Counts) -> Self {
        let mut initial = [0.0; N_STATES];
        let mut transition = [[0.0; N_STATES]; N_STATES];
        let mut emission: [HashMap<char, f64>; N_STATES] = Default::default();

        let lines = counts.line_count() as f64;
        for state in State::ALL {
            let s = state.index();

            if counts.line_count() > 0 {
                initial[s] = counts.init_count(state) as f64 / lines;
            }

            let total = counts.state_count(state);
            if total == 0 {
                continue;
            }
            let total = total as f64;

            for next in State::ALL {
                transition[s][next.index()] = counts.trans_count(state, next) as f64 / total;
            }

            emission[s] = counts
                .emissions(state)
                .iter()
                .map(|(&c, &n)| (c, n as f64 / total))
                .collect();
        }

        Self {
            initial,
            transition,
            emission,
        }
    }

    /// Atalho: conta e normaliza um corpus de uma só vez.
    pub fn from_corpus<I, S>(lines: I) -> crate::error::SegResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let counts = crate::counts::accumulate(lines)?;
        Ok(Self::normalize(&counts))
    }

    /// P(y_0 = state)
    pub fn initial(&self, state: State) -> f64 {
        self.initial[state.index()]
    }

    /// P(curr | prev)
    pub fn transition(&self, prev: State, curr: State) -> f64 {
        self.transition[prev.index()][curr.index()]
    }

    /// P(c | state). Caracteres nunca vistos sob `state` valem 0.
    pub fn emission(&self, state: State, c: char) -> f64 {
        self.emission[state.index()].get(&c).copied().unwrap_or(0.0)
    }

    /// Número de caracteres distintos observados sob `state`.
    pub fn vocab_size(&self, state: State) -> usize {
        self.emission[state.index()].len()
    }

    /// Os `n` caracteres mais prováveis sob `state`, em ordem decrescente
    /// (empates resolvidos pelo caractere, para saída estável).
    pub fn top_emissions(&self, state: State, n: usize) -> Vec<(char, f64)> {
        let mut items: Vec<(char, f64)> = self.emission[state.index()]
            .iter()
            .map(|(&c, &p)| (c, p))
            .collect();
        items.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        items.truncate(n);
        items
    }
}

impl From<&Counts> for ProbabilityModel {
    fn from(counts: &Counts) -> Self {
        Self::normalize(counts)
    }
}
