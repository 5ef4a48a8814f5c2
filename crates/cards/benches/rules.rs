criterion::criterion_main!(benches);
criterion::criterion_group! {
    name = benches;
    config = criterion::Criterion::default()
        .without_plots()
        .noise_threshold(3.0)
        .significance_level(0.01)
        .sample_size(10)
        .measurement_time(std::time::Duration::from_secs(1));
    targets =
        checking_classic_triple,
        searching_board_for_set,
        exhausting_full_deck_sets,
}

fn checking_classic_triple(c: &mut criterion::Criterion) {
    c.bench_function("check a Classic triple", |b| {
        let (x, y, z) = (Card::from(5), Card::from(40), Card::from(66));
        b.iter(|| Classic.is_valid_set(x, y, z))
    });
}

fn searching_board_for_set(c: &mut criterion::Criterion) {
    c.bench_function("find the first set among 12 shuffled cards", |b| {
        let mut deck = Deck::new(Card::COUNT);
        deck.shuffle();
        let board = deck.cards()[..12].to_vec();
        b.iter(|| Classic.has_set(&board))
    });
}

fn exhausting_full_deck_sets(c: &mut criterion::Criterion) {
    c.bench_function("enumerate every set in a full deck", |b| {
        let deck = Deck::new(Card::COUNT);
        b.iter(|| Classic.find_sets(deck.cards(), usize::MAX))
    });
}

use rbs_cards::*;
