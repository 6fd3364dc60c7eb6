use criterion::{Criterion, black_box, criterion_group, criterion_main};

use vermilion_core::journal::{Journal, Transaction, TransactionQueue};

// ---------------------------------------------------------------------------
// Journal mutation
// ---------------------------------------------------------------------------

fn bench_append_linear(c: &mut Criterion) {
    c.bench_function("journal_append_1000", |b| {
        b.iter(|| {
            let mut journal = Journal::new();
            for i in 0..1000 {
                journal.append(Transaction::exec_only(format!("edit {i}"), || {}));
            }
            black_box(journal.node_count())
        });
    });
}

fn bench_undo_redo_walk(c: &mut Criterion) {
    let mut journal = Journal::new();
    for i in 0..1000 {
        journal.append(Transaction::exec_only(format!("edit {i}"), || {}));
    }
    c.bench_function("journal_undo_redo_1000", |b| {
        b.iter(|| {
            while journal.undo() {}
            while journal.redo() {}
            black_box(journal.undo_count())
        });
    });
}

fn bench_validate(c: &mut Criterion) {
    let mut journal = Journal::new();
    for i in 0..1000 {
        journal.append(Transaction::exec_only(format!("edit {i}"), || {}));
        if i % 10 == 0 {
            journal.fork(Transaction::exec_only(format!("fork {i}"), || {}));
        }
    }
    c.bench_function("journal_validate_1100", |b| {
        b.iter(|| black_box(journal.validate()));
    });
}

// ---------------------------------------------------------------------------
// Transaction queue
// ---------------------------------------------------------------------------

fn bench_queue_push_drain(c: &mut Criterion) {
    c.bench_function("queue_push_drain_1000", |b| {
        b.iter(|| {
            let queue = TransactionQueue::new();
            for _ in 0..1000 {
                queue.push(Transaction::default());
            }
            black_box(queue.drain().len())
        });
    });
}

criterion_group!(
    benches,
    bench_append_linear,
    bench_undo_redo_walk,
    bench_validate,
    bench_queue_push_drain
);
criterion_main!(benches);
