//! # Contagem de Frequências (Treino do HMM)
//!
//! O treino do HMM é **puramente supervisionado**: o corpus já vem segmentado
//! (palavras separadas por espaço), então cada caractere tem um estado B/M/E/S
//! conhecido. Basta contar:
//!
//! 1. **Estados**: quantas vezes cada estado aparece.
//! 2. **Iniciais**: com que estado cada frase começa.
//! 3. **Transições**: quantas vezes o estado `s` é seguido por `s'`.
//! 4. **Emissões**: quantas vezes o estado `s` gera o caractere `c`.
//!
//! ## Exemplo
//!
//! ```text
//! "我 爱 北京"  →  caracteres: 我 爱 北 京
//!                  estados:    S  S  B  E
//! ```
//!
//! ## Emissão do primeiro caractere
//!
//! A emissão só é registrada a partir do índice 1: o primeiro caractere de cada
//! frase entra em `init_count` e `state_count`, mas nunca em `emit_count`. O
//! comportamento é mantido para paridade com o modelo de referência.
//!
//! ## Paralelismo
//!
//! [`Counts`] forma um monóide comutativo com [`Counts::merge`]: contagens
//! parciais de partes disjuntas do corpus podem ser somadas em qualquer ordem.
//! [`accumulate_parallel`] usa isso para distribuir as linhas entre threads do Rayon.

use std::collections::HashMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{SegError, SegResult};
use crate::label::labelmark;
use crate::state::{State, N_STATES};

/// Contagens brutas acumuladas em um passe de treino.
///
/// Todas as tabelas são indexadas por [`State::index`] e têm sempre as 4 entradas,
/// mesmo para estados que nunca apareceram.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    /// Ocorrências de cada estado.
    state_count: [u64; N_STATES],
    /// Ocorrências de cada estado na primeira posição de uma frase.
    init_count: [u64; N_STATES],
    /// `trans_count[prev][curr]`: quantas vezes `prev` foi seguido por `curr`.
    trans_count: [[u64; N_STATES]; N_STATES],
    /// `emit_count[state][c]`: quantas vezes `state` gerou o caractere `c`.
    emit_count: [HashMap<char, u64>; N_STATES],
    /// Número de frases (linhas não vazias) processadas.
    line_count: u64,
}

impl Counts {
    pub fn state_count(&self, state: State) -> u64 {
        self.state_count[state.index()]
    }

    pub fn init_count(&self, state: State) -> u64 {
        self.init_count[state.index()]
    }

    pub fn trans_count(&self, prev: State, curr: State) -> u64 {
        self.trans_count[prev.index()][curr.index()]
    }

    /// Contagem de emissão; pares nunca vistos valem 0.
    pub fn emit_count(&self, state: State, c: char) -> u64 {
        self.emit_count[state.index()].get(&c).copied().unwrap_or(0)
    }

    /// Todas as emissões observadas sob `state`.
    pub fn emissions(&self, state: State) -> &HashMap<char, u64> {
        &self.emit_count[state.index()]
    }

    pub fn line_count(&self) -> u64 {
        self.line_count
    }

    /// Total de caracteres vistos no treino.
    pub fn total_chars(&self) -> u64 {
        self.state_count.iter().sum()
    }

    /// Adiciona uma frase segmentada às contagens.
    ///
    /// Linhas vazias (ou só com espaços) são ignoradas e não contam em `line_count`.
    fn add_line(&mut self, line: &str) -> SegResult<()> {
        let mut prev: Option<State> = None;

        for word in line.split_ascii_whitespace() {
            for (state, c) in labelmark(word)?.into_iter().zip(word.chars()) {
                let s = state.index();
                self.state_count[s] += 1;

                match prev {
                    // Primeiro caractere da frase: só estado inicial, sem emissão
                    None => self.init_count[s] += 1,
                    Some(p) => {
                        self.trans_count[p.index()][s] += 1;
                        *self.emit_count[s].entry(c).or_insert(0) += 1;
                    }
                }
                prev = Some(state);
            }
        }

        if prev.is_some() {
            self.line_count += 1;
        }
        Ok(())
    }

    /// Soma duas contagens parciais. Associativa e comutativa; `Counts::default()`
    /// é o elemento neutro.
    pub fn merge(mut self, other: Counts) -> Counts {
        for s in 0..N_STATES {
            self.state_count[s] += other.state_count[s];
            self.init_count[s] += other.init_count[s];
            for t in 0..N_STATES {
                self.trans_count[s][t] += other.trans_count[s][t];
            }
        }
        for (mine, theirs) in self.emit_count.iter_mut().zip(other.emit_count) {
            for (c, n) in theirs {
                *mine.entry(c).or_insert(0) += n;
            }
        }
        self.line_count += other.line_count;
        self
    }

    /// Verifica os invariantes que qualquer contagem produzida por [`accumulate`] satisfaz.
    ///
    /// Toda ocorrência de um estado é ou o início de uma frase, ou o destino de
    /// exatamente uma transição, e cada transição registra exatamente uma emissão.
    /// Retorna a descrição da primeira violação encontrada.
    pub fn check_consistency(&self) -> Result<(), String> {
        let init_total = checked_sum(self.init_count.iter().copied())
            .ok_or("estouro na soma dos estados iniciais")?;
        if init_total != self.line_count {
            return Err(format!(
                "soma dos estados iniciais ({init_total}) difere do número de linhas ({})",
                self.line_count
            ));
        }

        for state in State::ALL {
            let s = state.index();
            let incoming = checked_sum((0..N_STATES).map(|p| self.trans_count[p][s]))
                .ok_or_else(|| format!("estado {state}: estouro nas transições de entrada"))?;
            let expected = self.init_count[s]
                .checked_add(incoming)
                .ok_or_else(|| format!("estado {state}: estouro em iniciais + transições"))?;
            if expected != self.state_count[s] {
                return Err(format!(
                    "estado {state}: {} ocorrências, mas {} iniciais + {incoming} transições",
                    self.state_count[s], self.init_count[s]
                ));
            }

            let emitted = checked_sum(self.emit_count[s].values().copied())
                .ok_or_else(|| format!("estado {state}: estouro na soma das emissões"))?;
            if emitted != incoming {
                return Err(format!(
                    "estado {state}: {emitted} emissões para {incoming} transições de entrada"
                ));
            }
        }
        Ok(())
    }
}

/// Soma que devolve `None` em vez de estourar.
fn checked_sum(mut values: impl Iterator<Item = u64>) -> Option<u64> {
    values.try_fold(0u64, u64::checked_add)
}

/// Conta as frequências de um corpus já segmentado (uma frase por linha).
///
/// ```rust
/// use seg_core::counts::accumulate;
/// use seg_core::state::State;
///
/// let counts = accumulate(["我 爱 北京"]).unwrap();
/// assert_eq!(counts.state_count(State::Single), 2);
/// assert_eq!(counts.line_count(), 1);
/// ```
pub fn accumulate<I, S>(lines: I) -> SegResult<Counts>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut counts = Counts::default();
    for line in lines {
        counts.add_line(line.as_ref())?;
    }
    tracing::debug!(
        lines = counts.line_count,
        chars = counts.total_chars(),
        "contagem sequencial concluída"
    );
    Ok(counts)
}

/// Versão paralela de [`accumulate`]: cada thread do Rayon conta uma fatia das
/// linhas e as contagens parciais são somadas com [`Counts::merge`].
///
/// O resultado é idêntico (por valor) ao de [`accumulate`].
pub fn accumulate_parallel<S>(lines: &[S]) -> SegResult<Counts>
where
    S: AsRef<str> + Sync,
{
    let counts = lines
        .par_iter()
        .try_fold(Counts::default, |mut acc, line| {
            acc.add_line(line.as_ref())?;
            Ok::<_, SegError>(acc)
        })
        .try_reduce(Counts::default, |a, b| Ok(a.merge(b)))?;

    tracing::debug!(
        lines = counts.line_count,
        chars = counts.total_chars(),
        "contagem paralela concluída"
    );
    Ok(counts)
}

/// Gera linhas de corpus curtas sobre um alfabeto pequeno, para testes de propriedade.
#[cfg(test)]
pub(crate) fn arb_line() -> impl proptest::strategy::Strategy<Value = String> {
    use proptest::strategy::Strategy;

    let chars = proptest::sample::select(vec!['我', '爱', '北', '京', '天']);
    let word = proptest::collection::vec(chars, 1..4)
        .prop_map(|cs| cs.into_iter().collect::<String>());
    proptest::collection::vec(word, 0..5).prop_map(|ws| ws.join(" "))
}
