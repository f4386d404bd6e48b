//! # Corpus de Treino Segmentado
//!
//! O formato de treino é o mesmo dos corpora clássicos de segmentação do chinês
//! (PKU, MSR): UTF-8, uma frase por linha, palavras separadas por espaço.
//!
//! ```text
//! 我 爱 北京 天安门
//! 天安门 上 太阳 升
//! ```
//!
//! Linhas vazias são ignoradas. Este módulo também traz um pequeno corpus
//! embutido, usado pelo servidor web quando nenhum snapshot é informado e
//! pelos testes.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::SegResult;

/// Lê todas as linhas de um arquivo de corpus.
pub fn read_corpus(path: impl AsRef<Path>) -> SegResult<Vec<String>> {
    let file = File::open(path.as_ref())?;
    let lines = lines_from_reader(BufReader::new(file))?;
    tracing::info!(path = %path.as_ref().display(), lines = lines.len(), "corpus lido");
    Ok(lines)
}

/// Lê as linhas de qualquer leitor, descartando o `\n` / `\r\n` final.
///
/// Linhas vazias são mantidas: quem decide ignorá-las é a contagem.
pub fn lines_from_reader<R: BufRead>(reader: R) -> SegResult<Vec<String>> {
    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line?;
        lines.push(line.trim_end_matches('\r').to_string());
    }
    Ok(lines)
}

/// Retorna o corpus de demonstração embutido (já segmentado)
pub fn demo_corpus() -> Vec<&'static str> {
    vec![
        // ===== COTIDIANO =====
        "我 爱 北京 天安门",
        "天安门 上 太阳 升",
        "他 说 我 爱 北京",
        "今天 天气 很 好",
        "我们 去 公园 散步",
        "你 今天 吃 饭 了 吗",
        "我 的 朋友 在 北京 工作",
        "明天 我们 一起 去 看 电影",
        // ===== EDUCAÇÃO =====
        "我们 在 学习 中文",
        "北京 大学 是 中国 有名 的 大学",
        "学生 们 在 图书馆 里 看 书",
        "老师 说 今天 没有 作业",
        "他 每天 都 学习 汉语",
        // ===== ECONOMIA =====
        "中国 经济 发展 很 快",
        "这 家 公司 在 上海 有 很多 员工",
        "银行 今天 发布 了 新 的 政策",
        "市场 价格 保持 稳定",
        // ===== HISTÓRIA E CULTURA =====
        "中华人民共和国 成立 于 一九四九年",
        "长城 是 中国 古代 的 伟大 工程",
        "春节 是 中国 最 重要 的 节日",
        "很多 人 喜欢 中国 的 传统 文化",
        // ===== CIÊNCIA E TECNOLOGIA =====
        "科学家 发现 了 一 种 新 的 材料",
        "人工智能 技术 发展 迅速",
        "我们 用 计算机 处理 数据",
        "研究 人员 在 实验室 工作",
    ]
}

/// Textos de demonstração (sem espaços) para a interface web
pub fn demo_texts() -> Vec<(&'static str, &'static str)> {
    vec![
        ("Cotidiano", "我爱北京天安门"),
        ("Cotidiano", "今天天气很好我们去公园散步"),
        ("Educação", "学生们在北京大学学习中文"),
        ("Economia", "中国经济发展很快市场价格保持稳定"),
        ("Cultura", "春节是中国最重要的传统节日"),
        ("Tecnologia", "研究人员用计算机处理数据"),
        ("Fora do vocabulário", "量子纠缠"),
    ]
}
