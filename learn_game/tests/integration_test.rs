use learn_game::agent::Agent;
use learn_game::board::{Board, IsGameOver, Mark, StateKey};
use learn_game::config::{AgentConfig, Rewards, TrainingConfig};
use learn_game::store::PolicyStore;
use learn_game::train_agent;

#[test]
fn trained_table_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("q_table_archive").join("qtable.pickle");
    let agent = Agent::new(AgentConfig::default(), PolicyStore::new(&path))
        .unwrap()
        .with_seed(11);
    let training = TrainingConfig {
        episodes: 500,
        log_every: 0,
        seed: Some(11),
        archive_dir: None,
    };
    let score = train_agent(agent, &training, Rewards::default()).unwrap();
    assert_eq!(score.games(), 500);

    let first = Agent::new(AgentConfig::default(), PolicyStore::new(&path)).unwrap();
    let second = Agent::new(AgentConfig::default(), PolicyStore::new(&path)).unwrap();
    assert!(!first.q_table().is_empty());
    assert_eq!(first.q_table(), second.q_table());

    for ((state, action), value) in first.q_table().iter() {
        assert!(state.is_well_formed());
        assert_eq!(state.cell(*action), Some(Mark::Empty));
        assert!(value.is_finite());
    }
}

#[test]
fn greedy_agent_plays_what_it_learned() {
    let dir = tempfile::tempdir().unwrap();
    let config = AgentConfig {
        exploration_rate: 0.0,
        ..AgentConfig::default()
    };
    let mut agent = Agent::new(config, PolicyStore::new(dir.path().join("q.json"))).unwrap();
    let state = StateKey::from("XO XOX OO");
    let mut board = Board::try_from(&state).unwrap();
    let legal = board.available_moves();
    assert_eq!(legal, vec![(0, 2), (2, 0)]);
    assert_eq!(agent.choose_action(&state, &legal).unwrap(), (0, 2));

    board.place((2, 0), Mark::Nought).unwrap();
    assert_eq!(board.status(), IsGameOver::Win(Mark::Nought));
    agent
        .update_value(&state, (2, 0), 1.0, &board.to_state_key(), &[])
        .unwrap();
    assert_eq!(agent.value(&state, (2, 0)), 0.5);
    assert_eq!(agent.choose_action(&state, &legal).unwrap(), (2, 0));
    agent.save().unwrap();

    let reloaded = Agent::new(config, PolicyStore::new(dir.path().join("q.json"))).unwrap();
    assert_eq!(reloaded.q_table(), agent.q_table());
}
