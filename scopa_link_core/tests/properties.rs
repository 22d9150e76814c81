//! 吃牌搜索、计分和线上视角翻转的性质测试

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use scopa_link_core::*;

fn table_and_card() -> impl Strategy<Value = (Vec<Card>, Card)> {
    (prop::sample::subsequence(all_cards(), 0..=10), prop::sample::select(all_cards()))
        .prop_filter("played card cannot be on the table", |(table, played)| !table.contains(played))
}

fn card_pile() -> impl Strategy<Value = Vec<Card>> {
    prop::sample::subsequence(all_cards(), 0..=DECK_SIZE)
}

/// 把任意一部分牌分给两个吃牌堆，没分到的牌谁也不拿（金币7 可能无人持有）
fn split_piles() -> impl Strategy<Value = Sides<Vec<Card>>> {
    (card_pile(), prop::collection::vec(any::<bool>(), DECK_SIZE)).prop_map(|(taken, owners)| {
        let mut piles = Sides::new(Vec::new(), Vec::new());
        for (card, mine) in taken.into_iter().zip(owners) {
            let side = if mine { Side::Player } else { Side::Opponent };
            piles[side].push(card);
        }
        piles
    })
}

/// 穷举所有子集，求和等于 `target` 的最小子集大小
fn brute_force_min(table: &[Card], target: u8) -> Option<usize> {
    (1u32..(1 << table.len()))
        .filter(|&mask| {
            let sum: u32 = (0..table.len())
                .filter(|&i| mask & (1u32 << i) != 0)
                .map(|i| table[i].value() as u32)
                .sum();
            sum == target as u32
        })
        .map(|mask| mask.count_ones() as usize)
        .min()
}

/// 随机合法出牌 `steps` 步之后的房主和加入方
fn advanced_pair(seed: u64, steps: usize) -> (Session, Session) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut host = Session::host("Anna", "Circolo");
    let mut joiner = Session::join("Luca");
    host.connect();
    joiner.connect();
    for msg in host.start_match(&mut rng).unwrap() {
        joiner.receive(&msg.encode()).unwrap();
    }

    for _ in 0..steps {
        if host.state().is_over() {
            break;
        }
        let (actor, watcher) = if host.state().is_my_turn() { (&mut host, &mut joiner) } else { (&mut joiner, &mut host) };
        let hand = &actor.state().hands.player;
        let card = hand[rng.random_range(0..hand.len())];
        for msg in actor.play(card).unwrap() {
            watcher.receive(&msg.encode()).unwrap();
        }
    }
    (host, joiner)
}

proptest! {
    #[test]
    fn capture_is_exact_and_minimal((table, played) in table_and_card()) {
        let minimal = brute_force_min(&table, played.value());
        match resolve(played, &table) {
            CaptureOutcome::NoCapture => prop_assert_eq!(minimal, None),
            CaptureOutcome::Capture { cards, scopa } => {
                let sum: u32 = cards.iter().map(|c| c.value() as u32).sum();
                prop_assert_eq!(sum, played.value() as u32);
                prop_assert!(cards.iter().all(|c| table.contains(c)));
                prop_assert_eq!(Some(cards.len()), minimal);
                prop_assert_eq!(scopa, cards.len() == table.len());
            }
        }
    }

    #[test]
    fn scoring_is_deterministic(pile in card_pile(), scopas in (0u32..6, 0u32..6)) {
        let opponent: Vec<Card> = all_cards().into_iter().filter(|c| !pile.contains(c)).collect();
        let captured = Sides::new(pile, opponent);
        let scopas = Sides::new(scopas.0, scopas.1);

        let first = score_match(&captured, &scopas);
        let second = score_match(&captured, &scopas);
        prop_assert_eq!(&first, &second);

        for side in [Side::Player, Side::Opponent] {
            let criteria = first.criteria_winners().iter().filter(|w| **w == Some(side)).count() as u32;
            prop_assert_eq!(first.totals[side], criteria + scopas[side]);
        }
    }

    #[test]
    fn sides_payloads_are_inverted_on_the_wire(player in card_pile(), opponent in card_pile(), points in (0u32..8, 0u32..8)) {
        let hands = Sides::new(player, opponent);
        let scopas = Sides::new(points.0, points.1);
        let mut receiver = Session::join("Luca");
        receiver.connect();
        receiver.receive("START_GAME").unwrap();

        for msg in [
            WireMessage::PlayersHands(hands.clone().swapped()),
            WireMessage::CardsTaken(hands.clone().swapped()),
            WireMessage::PlayersPoints(scopas.clone().swapped()),
            mirror::turn_message(Side::Player),
        ] {
            receiver.receive(&msg.encode()).unwrap();
        }

        let state = receiver.state();
        prop_assert_eq!(&state.hands.player, &hands.opponent);
        prop_assert_eq!(&state.hands.opponent, &hands.player);
        prop_assert_eq!(&state.captured.player, &hands.opponent);
        prop_assert_eq!(&state.captured.opponent, &hands.player);
        prop_assert_eq!(state.scopas.player, scopas.opponent);
        prop_assert_eq!(state.scopas.opponent, scopas.player);
        prop_assert_eq!(state.turn, Side::Opponent);
    }

    #[test]
    fn score_payloads_are_inverted_on_the_wire(piles in split_piles(), points in (0u32..8, 0u32..8)) {
        let scopas = Sides::new(points.0, points.1);
        let sent = score_match(&piles, &scopas);
        let mut receiver = Session::join("Luca");
        receiver.connect();
        receiver.receive("START_GAME").unwrap();
        receiver.receive(&WireMessage::CardsTaken(piles.clone().swapped()).encode()).unwrap();
        receiver.receive(&WireMessage::PlayersPoints(scopas.clone().swapped()).encode()).unwrap();

        let mut last = None;
        for msg in mirror::score_messages(&sent) {
            last = Some(receiver.receive(&msg.encode()).unwrap());
        }

        let received = receiver.state().final_score.clone().unwrap();
        prop_assert_eq!(last, Some(Inbound::Match(mirror::Installed::Scored(received.clone()))));
        prop_assert_eq!(&received.cards, &sent.cards.clone().swapped());
        prop_assert_eq!(&received.coins, &sent.coins.clone().swapped());
        prop_assert_eq!(&received.sevens, &sent.sevens.clone().swapped());
        prop_assert_eq!(&received.scopas, &sent.scopas.clone().swapped());
        prop_assert_eq!(&received.totals, &sent.totals.clone().swapped());
        prop_assert_eq!(received.settebello, sent.settebello.map(Side::flip));
        if !piles.player.contains(&Card::SETTEBELLO) && !piles.opponent.contains(&Card::SETTEBELLO) {
            prop_assert_eq!(received.settebello, None);
        }
    }

    #[test]
    fn mirrors_agree_at_every_step(seed in any::<u64>(), steps in 0usize..=36) {
        let (host, joiner) = advanced_pair(seed, steps);
        let (h, j) = (host.state(), joiner.state());
        prop_assert_eq!(&h.deck, &j.deck);
        prop_assert_eq!(&h.table, &j.table);
        prop_assert_eq!(&h.hands, &j.hands.clone().swapped());
        prop_assert_eq!(&h.captured, &j.captured.clone().swapped());
        prop_assert_eq!(&h.scopas, &j.scopas.clone().swapped());
        prop_assert_eq!(h.turn, j.turn.flip());
        prop_assert_eq!(h.last_capturer, j.last_capturer.map(Side::flip));
        prop_assert_eq!(h.card_count(), DECK_SIZE);
        prop_assert_eq!(j.card_count(), DECK_SIZE);
    }

    #[test]
    fn turn_flips_only_on_accepted_moves(seed in any::<u64>(), steps in 0usize..30, pick in 0usize..DECK_SIZE, as_host in any::<bool>()) {
        let (mut host, mut joiner) = advanced_pair(seed, steps);
        let session = if as_host { &mut host } else { &mut joiner };
        let before = session.state().clone();
        let card = all_cards()[pick];

        match session.play(card) {
            Ok(_) => {
                prop_assert_eq!(session.state().turn, before.turn.flip());
                prop_assert_eq!(before.turn, Side::Player);
            }
            Err(_) => {
                prop_assert_eq!(session.state().turn, before.turn);
                prop_assert_eq!(&session.state().hands, &before.hands);
                prop_assert_eq!(&session.state().table, &before.table);
            }
        }
    }
}
