use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use quizforge_core::bank::QuestionBank;
use quizforge_core::generator::{generate_practice, ExamGenerator, PracticeSelection};
use quizforge_core::matrix::parse_matrix;
use quizforge_core::model::{MatrixSpec, QuestionKind, QuestionRecord};

/// A bank the size of a real one: a few hundred records over several topics.
fn make_bank() -> QuestionBank {
    let records = (1..=600u32)
        .map(|id| QuestionRecord {
            id,
            class_tag: format!("12.{}.{}", id % 6 + 1, id % 4 + 1).parse().unwrap(),
            prompt: format!("question {id}"),
            kind: if id % 2 == 0 {
                QuestionKind::MultipleChoice {
                    options: vec!["A".into(), "B".into()],
                    correct_option: "A".into(),
                }
            } else {
                QuestionKind::ShortAnswer {
                    correct_answer: "x".into(),
                }
            },
        })
        .collect();
    QuestionBank::new("bench", records)
}

fn bench_parse(c: &mut Criterion) {
    let spec = MatrixSpec {
        multiple_choice: Some("[6]; 12.1.4; 12.2.4; 12.3.4; 12.4.4; 12.5.4; 12.6.4".into()),
        short_answer: Some("[4]; 12.1.2; 12.3.2; 12.5.2".into()),
        tier3: Some("M12.1.1; M12.2.1; S12.3.1".into()),
        tier4: Some("M12.4.1; S12.5.1".into()),
        duration_minutes: 50.0,
        ..Default::default()
    };
    c.bench_function("parse_matrix", |b| b.iter(|| parse_matrix(black_box(&spec))));
}

fn bench_generate(c: &mut Criterion) {
    let bank = make_bank();
    let spec = MatrixSpec {
        multiple_choice: Some("[6]; 12.1.4; 12.2.4; 12.3.4; 12.4.4".into()),
        short_answer: Some("[4]; 12.1.3; 12.3.3".into()),
        tier3: Some("M12.1.1; S12.3.1".into()),
        tier4: Some("M12.2.2".into()),
        duration_minutes: 45.0,
        ..Default::default()
    };
    let matrix = parse_matrix(&spec).unwrap();
    let generator = ExamGenerator::new(&bank);

    let mut group = c.benchmark_group("generate");
    group.bench_function("matrix", |b| {
        let mut rng = StdRng::seed_from_u64(1);
        b.iter(|| generator.generate(black_box(&matrix), &mut rng))
    });
    group.bench_function("practice", |b| {
        let selection = PracticeSelection {
            grade: 12,
            topics: vec![1, 2, 3],
        };
        let mut rng = StdRng::seed_from_u64(1);
        b.iter(|| generate_practice(&bank, black_box(&selection), 30, &mut rng))
    });
    group.finish();
}

criterion_group!(benches, bench_parse, bench_generate);
criterion_main!(benches);
