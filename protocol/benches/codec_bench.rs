// Attachment codec and vote-gate benchmarks for the Tessera protocol.
//
// Covers encoding and decoding of the larger attachment variants and the
// pending-transaction gate at a few batch sizes.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use tessera_protocol::ledger::{LedgerTransaction, MemoryChain};
use tessera_protocol::transaction::{
    AliasAssignment, ArbitraryMessage, AssetIssuance, Attachment, PendingPaymentVoteCasting,
    PhasedTransactionGate, TransactionType, TwoPhased,
};

fn bench_encode(c: &mut Criterion) {
    let alias: Attachment = AliasAssignment::new("tessera", &"u".repeat(512))
        .expect("alias")
        .into();
    let issuance: Attachment = AssetIssuance::new("Gold", Some(&"d".repeat(1_000)), 1_000_000)
        .expect("issuance")
        .into();

    c.bench_function("attachment/encode_alias", |b| b.iter(|| alias.to_bytes()));
    c.bench_function("attachment/encode_issuance", |b| {
        b.iter(|| issuance.to_bytes())
    });
    c.bench_function("attachment/json_issuance", |b| b.iter(|| issuance.to_json()));
}

fn bench_decode_message(c: &mut Criterion) {
    let mut group = c.benchmark_group("attachment/decode_message");
    for size in [64usize, 1_024, 65_536] {
        let bytes = Attachment::from(ArbitraryMessage::new(vec![0xAB; size]).expect("message"))
            .to_bytes();
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &bytes, |b, bytes| {
            b.iter(|| Attachment::from_bytes(TransactionType::ArbitraryMessage, bytes))
        });
    }
    group.finish();
}

fn bench_vote_gate(c: &mut Criterion) {
    let chain = MemoryChain::new();
    chain.set_height(100);
    for id in 1..=255u64 {
        let payload: Attachment = ArbitraryMessage::new(b"pending".to_vec())
            .expect("message")
            .into();
        chain.insert(LedgerTransaction::new(id, 1, 1, payload).with_phasing(TwoPhased::new(1_000)));
    }
    let gate = PhasedTransactionGate::new(u8::MAX);

    let mut group = c.benchmark_group("phasing/validate");
    for count in [1usize, 10, 255] {
        let values: Vec<String> = (1..=count as u64).map(|id| id.to_string()).collect();
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &values, |b, values| {
            b.iter(|| gate.validate(values, &chain))
        });
    }
    group.finish();

    let ids: Vec<u64> = (1..=255).collect();
    c.bench_function("attachment/encode_vote_casting_255", |b| {
        b.iter(|| {
            Attachment::from(PendingPaymentVoteCasting::new(ids.clone()).expect("votes")).to_bytes()
        })
    });
}

criterion_group!(benches, bench_encode, bench_decode_message, bench_vote_gate);
criterion_main!(benches);
