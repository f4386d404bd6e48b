//! # Reconstrução dos Segmentos
//!
//! Converte o caminho de estados do Viterbi de volta em palavras:
//!
//! ```text
//! texto:    我 爱 北 京
//! caminho:  S  S  B  E
//! palavras: ["我", "爱", "北京"]
//! ```
//!
//! - **B** abre uma palavra
//! - **M** não faz nada
//! - **E** fecha a palavra aberta (inclusive o caractere atual)
//! - **S** emite o caractere atual sozinho
//!
//! ## Caminhos mal formados
//!
//! A concatenação das palavras é **sempre** igual ao texto original, mesmo para
//! caminhos que não vieram do Viterbi (`[B, B, E]`, `[M, M]`, `[S, E]`...).
//! Quando o caminho não fecha uma palavra corretamente, os caracteres pendentes
//! viram um segmento próprio e o evento é registrado com `tracing::warn!`.
//! Isso nunca é tratado como erro.

use crate::state::State;

/// Reconstrói as palavras de `text` a partir do caminho de estados `path`.
///
/// Se `path` for mais curto que o texto, o restante vira o último segmento;
/// estados além do fim do texto são ignorados.
pub fn reconstruct(text: &str, path: &[State]) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    reconstruct_chars(&chars, path)
}

/// Como [`reconstruct`], sobre o texto já separado em caracteres.
pub fn reconstruct_chars(chars: &[char], path: &[State]) -> Vec<String> {
    if path.len() != chars.len() {
        tracing::warn!(
            chars = chars.len(),
            states = path.len(),
            "caminho com tamanho diferente do texto"
        );
    }

    let mut words = Vec::new();
    // Início do trecho ainda não emitido
    let mut cursor = 0;

    for (i, state) in path.iter().take(chars.len()).enumerate() {
        match state {
            State::Begin => {
                if cursor < i {
                    tracing::warn!(
                        start = cursor,
                        end = i,
                        "palavra aberta sem fechamento antes de B"
                    );
                    words.push(collect(&chars[cursor..i]));
                }
                cursor = i;
            }
            State::Middle => {}
            State::End => {
                words.push(collect(&chars[cursor..=i]));
                cursor = i + 1;
            }
            State::Single => {
                if cursor < i {
                    tracing::warn!(
                        start = cursor,
                        end = i,
                        "palavra aberta sem fechamento antes de S"
                    );
                    words.push(collect(&chars[cursor..i]));
                }
                words.push(chars[i].to_string());
                cursor = i + 1;
            }
        }
    }

    if cursor < chars.len() {
        tracing::warn!(
            start = cursor,
            len = chars.len(),
            "caminho termina sem E/S; sufixo emitido como último segmento"
        );
        words.push(collect(&chars[cursor..]));
    }

    words
}

fn collect(chars: &[char]) -> String {
    chars.iter().collect()
}
