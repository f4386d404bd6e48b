//! # Esquema de Estados B/M/E/S
//!
//! Cada caractere de uma frase segmentada recebe um estado que indica sua
//! posição dentro da palavra:
//!
//! | Estado | Significado                     | Exemplo (`北京`, `我`) |
//! |--------|---------------------------------|------------------------|
//! | B      | Begin: primeiro caractere       | **北**京               |
//! | M      | Middle: caractere interno       | (palavras com 3+)      |
//! | E      | End: último caractere           | 北**京**               |
//! | S      | Single: palavra de um caractere | **我**                 |
//!
//! ## Duas ordens diferentes
//!
//! - **Ordem de armazenamento** ([`State::index`]): B=0, M=1, E=2, S=3. Usada para
//!   indexar as matrizes de contagem e de probabilidade.
//! - **Ordem de desempate** ([`Ord`]): `Single > Middle > End > Begin`. Quando dois
//!   candidatos do Viterbi têm o mesmo score, vence o estado maior nesta ordem.
//!   Com dados esparsos as colunas inteiras do Viterbi costumam valer 0, e a saída
//!   só é reprodutível se esta regra for seguida à risca.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Posição de um caractere dentro de uma palavra.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum State {
    Begin,
    Middle,
    End,
    Single,
}

/// Número de estados do modelo. A topologia é fixa.
pub const N_STATES: usize = 4;

impl State {
    /// Todos os estados, na ordem de armazenamento.
    pub const ALL: [State; N_STATES] = [State::Begin, State::Middle, State::End, State::Single];

    /// Índice do estado nas matrizes (0..4).
    pub fn index(self) -> usize {
        match self {
            State::Begin => 0,
            State::Middle => 1,
            State::End => 2,
            State::Single => 3,
        }
    }

    /// Inverso de [`State::index`].
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Rótulo de uma letra (ex: "B", "S").
    pub fn label(self) -> &'static str {
        match self {
            State::Begin => "B",
            State::Middle => "M",
            State::End => "E",
            State::Single => "S",
        }
    }

    /// Tenta parsear a partir do rótulo de uma letra.
    pub fn from_label(s: &str) -> Option<Self> {
        match s {
            "B" => Some(State::Begin),
            "M" => Some(State::Middle),
            "E" => Some(State::End),
            "S" => Some(State::Single),
            _ => None,
        }
    }

    /// Posto do estado na ordem de desempate.
    fn rank(self) -> u8 {
        match self {
            State::Begin => 0,
            State::End => 1,
            State::Middle => 2,
            State::Single => 3,
        }
    }
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Compara dois candidatos `(score, estado)` do Viterbi.
///
/// O score decide primeiro (via `total_cmp`, sem depender de `NaN`); empates são
/// resolvidos pela ordem `Single > Middle > End > Begin`.
pub fn cmp_candidates(a: (f64, State), b: (f64, State)) -> Ordering {
    a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1))
}
