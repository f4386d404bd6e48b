//! Fluxo completo: treino → snapshot → carga → segmentação.

use seg_core::persistence;
use seg_core::viterbi::decode_with_trace;
use seg_core::{accumulate, accumulate_parallel, ProbabilityModel, Segmenter, State};

#[test]
fn worked_example_end_to_end() {
    let counts = accumulate(["我 爱 北京"]).unwrap();
    assert_eq!(counts.state_count(State::Single), 2);
    assert_eq!(counts.state_count(State::Begin), 1);
    assert_eq!(counts.state_count(State::End), 1);
    assert_eq!(counts.state_count(State::Middle), 0);
    assert_eq!(counts.line_count(), 1);

    let model = ProbabilityModel::normalize(&counts);
    assert_eq!(model.initial(State::Single), 1.0);
    assert_eq!(model.transition(State::Single, State::Single), 0.5);
    assert_eq!(model.transition(State::Single, State::Begin), 0.5);
    assert_eq!(model.transition(State::Begin, State::End), 1.0);
    assert_eq!(model.emission(State::Single, '爱'), 0.5);
    assert_eq!(model.emission(State::Begin, '北'), 1.0);
    assert_eq!(model.emission(State::End, '京'), 1.0);
    assert_eq!(model.emission(State::Single, '我'), 0.0);

    let trace = decode_with_trace("我爱", &model).unwrap();
    assert!(trace
        .steps
        .iter()
        .all(|step| step.scores.iter().all(|s| s.score == 0.0)));
    assert_eq!(trace.path, vec![State::Single, State::Single]);

    let segmenter = Segmenter::new(model);
    assert_eq!(segmenter.segment("我爱").unwrap(), vec!["我", "爱"]);
}

#[test]
fn snapshot_roundtrip_preserves_segmentation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hmm_model.json");

    let lines: Vec<&str> = seg_core::corpus::demo_corpus();
    let counts = accumulate_parallel(&lines).unwrap();
    persistence::save(&counts, &path).unwrap();

    let fresh = Segmenter::from_counts(&counts);
    let loaded = Segmenter::load(&path).unwrap();

    for (_, text) in seg_core::corpus::demo_texts() {
        assert_eq!(fresh.segment(text).unwrap(), loaded.segment(text).unwrap());
    }
}

#[test]
fn corpus_file_training_skips_blank_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corpus.txt");
    std::fs::write(&path, "我 爱 北京\n\n   \n天安门 上 太阳 升\n").unwrap();

    let lines = seg_core::corpus::read_corpus(&path).unwrap();
    let counts = accumulate(&lines).unwrap();
    assert_eq!(counts.line_count(), 2);
    assert_eq!(counts.init_count(State::Single), 1);
    assert_eq!(counts.init_count(State::Begin), 1);
}

#[test]
fn model_is_shareable_across_threads() {
    let segmenter = Segmenter::demo().unwrap();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let s = segmenter.clone();
            std::thread::spawn(move || s.segment("我们在学习中文").unwrap())
        })
        .collect();

    let expected = segmenter.segment("我们在学习中文").unwrap();
    for h in handles {
        assert_eq!(h.join().unwrap(), expected);
    }
}
