use criterion::{black_box, criterion_group, criterion_main, Criterion};

use quizforge_core::model::{ExamConfig, QuestionKind, QuestionRecord, Statement};
use quizforge_core::scoring::{score, true_false_credit, Answer, AnswerSheet};

fn make_exam(size: u32) -> (Vec<QuestionRecord>, AnswerSheet) {
    let mut questions = Vec::new();
    let mut answers = AnswerSheet::new();

    for id in 0..size {
        let kind = match id % 3 {
            0 => QuestionKind::MultipleChoice {
                options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
                correct_option: "B".into(),
            },
            1 => QuestionKind::TrueFalseSet {
                statements: (0..4)
                    .map(|i| Statement {
                        text: format!("statement {i}"),
                        is_true: i % 2 == 0,
                    })
                    .collect(),
            },
            _ => QuestionKind::ShortAnswer {
                correct_answer: "forty two".into(),
            },
        };
        let answer = match &kind {
            QuestionKind::MultipleChoice { .. } => Answer::Choice((id % 4) as usize),
            QuestionKind::TrueFalseSet { .. } => {
                Answer::Statements(vec![Some(true), Some(true), Some(true), None])
            }
            QuestionKind::ShortAnswer { .. } => Answer::Text(" Forty Two ".into()),
        };
        questions.push(QuestionRecord {
            id,
            class_tag: "12.4.1".parse().unwrap(),
            prompt: String::new(),
            kind,
        });
        answers.insert(id, answer);
    }

    (questions, answers)
}

fn bench_true_false_credit(c: &mut Criterion) {
    c.bench_function("true_false_credit", |b| {
        b.iter(|| true_false_credit(black_box(3), black_box(4)))
    });
}

fn bench_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("score");
    let config = ExamConfig::practice([20, 10, 10], [4.0, 4.0, 2.0], 50);

    for size in [40u32, 400, 4000] {
        let (questions, answers) = make_exam(size);
        group.bench_function(format!("questions={size}"), |b| {
            b.iter(|| score(black_box(&questions), black_box(&answers), black_box(&config)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_true_false_credit, bench_score);
criterion_main!(benches);
