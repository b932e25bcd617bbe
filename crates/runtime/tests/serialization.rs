use std::sync::Arc;

use battle_content::CatalogLoader;
use battle_core::{
    Action, ActionId, ActionTarget, BasicAction, BattleConfig, BattleEngine, BattleEnv, BattleId,
    BattleState, BattleType, BattleUserState, JutsuId, LoadoutEntry, PcgRng, Position, UserId,
    legal_actions,
};
use battle_runtime::{
    BattleRepository, BattleService, InMemoryBattleRepo, InMemoryLadderRepo, Submission,
};

fn battle_after_one_round() -> Submission {
    let mut alice = BattleUserState::new(UserId(1), "alice");
    alice.position = Position::new(1, 1);
    alice.jutsus.push(LoadoutEntry::new(JutsuId(7), 1));
    let mut bob = BattleUserState::new(UserId(2), "bob");
    bob.position = Position::new(2, 1);
    let state = BattleState::new(BattleId(3), BattleType::Arena, 11)
        .with_user(alice)
        .with_user(bob);

    let service = BattleService::with_embedded_content(
        Arc::new(InMemoryBattleRepo::with_battle(state)),
        Arc::new(InMemoryLadderRepo::new()),
    )
    .unwrap();
    // Iron Skin leaves lingering effects in the state
    let action = Action::new(ActionId::Jutsu(JutsuId(7)), ActionTarget::User(UserId(1)));
    service.submit(BattleId(3), UserId(1), action).unwrap()
}

#[test]
fn json_round_trip_preserves_state_and_digest() {
    let submission = battle_after_one_round();
    assert!(!submission.outcome.state.user_effects.is_empty());

    let json = serde_json::to_string(&submission.outcome.state).unwrap();
    let restored: BattleState = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, submission.outcome.state);
    assert_eq!(
        hex::encode(restored.digest().unwrap()),
        submission.digest
    );
}

#[test]
fn bincode_encoding_is_deterministic() {
    let first = battle_after_one_round();
    let second = battle_after_one_round();
    assert_eq!(first.digest, second.digest);

    let bytes = bincode::serialize(&first.outcome.state).unwrap();
    assert_eq!(bytes, bincode::serialize(&second.outcome.state).unwrap());
    let restored: BattleState = bincode::deserialize(&bytes).unwrap();
    assert_eq!(restored, first.outcome.state);
}

#[test]
fn restored_state_resolves_identically() {
    let state = battle_after_one_round().outcome.state;
    let restored: BattleState =
        serde_json::from_str(&serde_json::to_string(&state).unwrap()).unwrap();

    let catalog = CatalogLoader::embedded().unwrap();
    let rng = PcgRng;
    let config = BattleConfig::default();
    let env = BattleEnv::new(&catalog, &rng, &config);
    assert_eq!(
        legal_actions(&state, UserId(2), &env),
        legal_actions(&restored, UserId(2), &env)
    );

    let attack = Action::basic(BasicAction::BasicAttack, ActionTarget::User(UserId(1)));
    let engine = BattleEngine::new(env);
    assert_eq!(
        engine.resolve(&state, &attack, UserId(2)).unwrap(),
        engine.resolve(&restored, &attack, UserId(2)).unwrap()
    );
}

#[test]
fn submissions_serialize_for_hosts() {
    let submission = battle_after_one_round();
    let json = serde_json::to_value(&submission).unwrap();
    assert!(json["outcome"]["log"].as_array().is_some_and(|log| !log.is_empty()));

    let restored: Submission = serde_json::from_value(json).unwrap();
    assert_eq!(restored, submission);
}

#[test]
fn stored_state_matches_the_returned_one() {
    let state = BattleState::new(BattleId(8), BattleType::Spar, 1);
    let repo = InMemoryBattleRepo::new();
    repo.insert(&state).unwrap();
    assert_eq!(repo.load(BattleId(8)).unwrap(), Some(state));
}
