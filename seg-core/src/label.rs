//! Rotulagem B/M/E/S de uma palavra já segmentada.

use crate::error::{SegError, SegResult};
use crate::state::State;

/// Converte o tamanho (em caracteres) de uma palavra na sua sequência de estados.
///
/// - 1 caractere → `[S]`
/// - n ≥ 2 → `[B] + [M] × (n − 2) + [E]`
///
/// Palavras vazias são rejeitadas com [`SegError::InvalidInput`].
///
/// ```rust
/// use seg_core::label::labelmark;
/// use seg_core::state::State;
///
/// let states = labelmark("北京").unwrap();
/// assert_eq!(states, vec![State::Begin, State::End]);
/// ```
pub fn labelmark(word: &str) -> SegResult<Vec<State>> {
    labels_for_len(word.chars().count())
}

/// Sequência de estados para uma palavra de `len` caracteres.
pub fn labels_for_len(len: usize) -> SegResult<Vec<State>> {
    match len {
        0 => Err(SegError::InvalidInput(
            "palavra de tamanho zero não pode ser rotulada".to_string(),
        )),
        1 => Ok(vec![State::Single]),
        n => {
            let mut states = Vec::with_capacity(n);
            states.push(State::Begin);
            states.extend(std::iter::repeat(State::Middle).take(n - 2));
            states.push(State::End);
            Ok(states)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use State::*;

    #[test]
    fn test_known_lengths() {
        assert_eq!(labelmark("我").unwrap(), vec![Single]);
        assert_eq!(labelmark("北京").unwrap(), vec![Begin, End]);
        assert_eq!(
            labelmark("中华人民国").unwrap(),
            vec![Begin, Middle, Middle, Middle, End]
        );
    }

    #[test]
    fn test_empty_word_is_rejected() {
        assert!(matches!(labelmark(""), Err(SegError::InvalidInput(_))));
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        // "京" ocupa 3 bytes em UTF-8, mas é um único caractere
        assert_eq!(labelmark("京").unwrap(), vec![Single]);
    }

    proptest::proptest! {
        #[test]
        fn label_len_matches_word_len(n in 1usize..64) {
            let states = labels_for_len(n).unwrap();
            proptest::prop_assert_eq!(states.len(), n);
            if n == 1 {
                proptest::prop_assert_eq!(states[0], Single);
            } else {
                proptest::prop_assert_eq!(states[0], Begin);
                proptest::prop_assert_eq!(states[n - 1], End);
                proptest::prop_assert!(states[1..n - 1].iter().all(|s| *s == Middle));
            }
        }
    }
}
