//! Single observer information set monte carlo tree search (SO-ISMCTS) with
//! root parallelization.
//!
//! Each worker owns a private tree over information sets of the observer.
//! Every iteration samples a determinization of the hidden cards, descends
//! the tree using only actions legal in that determinization, expands one
//! unexplored action, plays the game out randomly and backpropagates the
//! terminal reward. A worker keeps iterating until the shared stop flag
//! fires; the parallelizer then merges the per-action visit counts of all
//! root nodes and plays the most visited action.
//!
//! Follows Cowling, Powley and Whitehouse, "Information Set Monte Carlo Tree
//! Search" and Sephton et al., "Parallelization of Information Set Monte
//! Carlo Tree Search".

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::agents::Agent;
use crate::game::cards::{Card, Rank};
use crate::game::sim::{Action, SimGame};
use crate::game::{Game, Move};

#[derive(Clone, Debug)]
pub struct SearchConfig {
    /// Exploration constant of the modified UCB1 rule. Larger values explore
    /// more.
    pub exploration: f64,
    /// Wall clock budget per move.
    pub time_per_move: Duration,
    /// Number of search workers; defaults to the available hardware
    /// parallelism.
    pub workers: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            exploration: 5.4,
            time_per_move: Duration::from_secs(2),
            workers: None,
        }
    }
}

type NodeId = usize;

const ROOT: NodeId = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Node {
    parent: Option<NodeId>,
    /// Children keyed by action; branching is at most twelve, so a short
    /// vector with linear scans beats a map here.
    children: Vec<(Action, NodeId)>,
    visits: u32,
    /// How many times this node's action was legal while its parent was
    /// visited. Replaces the parent visit count in the UCB denominator.
    availability: u32,
    score: i64,
}

impl Node {
    fn new(parent: Option<NodeId>) -> Self {
        Self {
            parent,
            children: Vec::new(),
            visits: 0,
            availability: 1,
            score: 0,
        }
    }
}

/// Search tree owned by a single worker, nodes held in an arena with parent
/// back references for backpropagation.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SearchTree {
    nodes: Vec<Node>,
}

impl SearchTree {
    fn new() -> Self {
        Self {
            nodes: vec![Node::new(None)],
        }
    }

    fn child(&self, id: NodeId, action: Action) -> Option<NodeId> {
        self.nodes[id]
            .children
            .iter()
            .find(|&&(a, _)| a == action)
            .map(|&(_, child)| child)
    }

    fn add_child(&mut self, id: NodeId, action: Action) -> NodeId {
        let child = self.nodes.len();
        self.nodes.push(Node::new(Some(id)));
        self.nodes[id].children.push((action, child));
        child
    }

    /// A node is fully expanded under the current determinization when every
    /// legal action leads to a child that has been visited at least once.
    fn is_expanded(&self, id: NodeId, legal: &[Action]) -> bool {
        legal
            .iter()
            .all(|&a| matches!(self.child(id, a), Some(child) if self.nodes[child].visits > 0))
    }

    /// Descends one level using modified UCB1 over the children whose action
    /// is legal in the current determinization. Every legal child has its
    /// availability bumped, selected or not. The observer maximizes the
    /// average score, the opponent minimizes it.
    fn select_child(
        &mut self,
        id: NodeId,
        legal: &[Action],
        observer_to_move: bool,
        exploration: f64,
    ) -> (Action, NodeId) {
        let sign = if observer_to_move { 1.0 } else { -1.0 };
        let mut best_score = f64::NEG_INFINITY;
        let mut best = None;

        for &action in legal {
            let child_id = self
                .child(id, action)
                .expect("expanded node is missing a child for a legal action");
            let child = &mut self.nodes[child_id];
            debug_assert!(child.visits > 0);

            let exploit = sign * child.score as f64 / child.visits as f64;
            let explore = exploration
                * (2.0 * (child.availability as f64).ln() / child.visits as f64).sqrt();
            let ucb = exploit + explore;
            if ucb > best_score {
                best_score = ucb;
                best = Some((action, child_id));
            }

            child.availability += 1;
        }

        best.expect("selection over an empty legal action set")
    }

    /// Creates (or first-visits) one uniformly chosen unexplored child and
    /// applies its action to the determinization.
    fn expand_random<R: rand::Rng>(
        &mut self,
        id: NodeId,
        gs: &mut SimGame,
        legal: &[Action],
        rng: &mut R,
    ) -> NodeId {
        let unexplored: Vec<Action> = legal
            .iter()
            .copied()
            .filter(|&a| {
                self.child(id, a)
                    .map_or(true, |child| self.nodes[child].visits == 0)
            })
            .collect();

        let action = *unexplored
            .choose(rng)
            .expect("expansion called on a fully expanded node");
        let child = match self.child(id, action) {
            Some(child) => child,
            None => self.add_child(id, action),
        };

        gs.apply_action(action);
        self.nodes[child].visits += 1;
        child
    }
}

/// One determinize / select / expand / rollout / backpropagate pass.
fn search_iteration<R: rand::Rng>(
    tree: &mut SearchTree,
    view: &Game,
    exploration: f64,
    rng: &mut R,
    legal: &mut Vec<Action>,
) {
    let mut gs = view.determinize(rng);

    // select, keeping the determinization in lockstep with the descent
    let mut node = ROOT;
    while !gs.is_terminal() {
        gs.legal_actions(legal);
        if !tree.is_expanded(node, legal) {
            node = tree.expand_random(node, &mut gs, legal, rng);
            break;
        }

        let (action, child) = tree.select_child(node, legal, !gs.is_opponent_move, exploration);
        tree.nodes[child].visits += 1;
        gs.apply_action(action);
        node = child;
    }

    let reward = i64::from(gs.rollout(rng));

    // the root accumulates no score, its children carry the statistics
    let mut current = node;
    while let Some(parent) = tree.nodes[current].parent {
        tree.nodes[current].score += reward;
        current = parent;
    }
}

/// Runs iterations until the stop flag is observed; polled once per
/// iteration, so a pending iteration always completes.
fn run_worker(view: &Game, exploration: f64, stop: &AtomicBool, mut rng: StdRng) -> SearchTree {
    let mut tree = SearchTree::new();
    let mut legal = Vec::new();
    let mut iterations = 0u64;

    while !stop.load(Ordering::Relaxed) {
        search_iteration(&mut tree, view, exploration, &mut rng, &mut legal);
        iterations += 1;
    }

    debug!(
        "worker stopped after {} iterations, {} nodes",
        iterations,
        tree.nodes.len()
    );
    tree
}

/// Searches the observer's best move within the configured time budget.
///
/// Spawns one worker per unit of hardware parallelism, each with its own
/// tree and entropy-seeded rng; a timer thread flips the stop flag when the
/// budget runs out. The action with the highest visit count summed across
/// all workers wins.
pub fn choose_move(view: &Game, config: &SearchConfig) -> Move {
    assert!(!view.is_opponent_move(), "it is not the observer's turn");
    assert!(
        view.score() < 66 && view.opponent_score() < 66 && !view.hand().is_empty(),
        "the game is already over"
    );
    assert!(config.time_per_move > Duration::ZERO);

    let workers = config.workers.unwrap_or_else(|| {
        thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
    });
    assert!(workers > 0, "at least one worker is required");
    let stop = AtomicBool::new(false);
    let (tx, rx) = crossbeam_channel::bounded::<SearchTree>(workers);

    let mut stats: Vec<(Action, u32)> = Vec::new();
    thread::scope(|s| {
        for _ in 0..workers {
            let tx = tx.clone();
            let stop = &stop;
            s.spawn(move || {
                // each worker draws an independent random stream
                let rng = StdRng::from_entropy();
                let tree = run_worker(view, config.exploration, stop, rng);
                tx.send(tree).expect("result channel closed early");
            });
        }

        s.spawn(|| {
            thread::sleep(config.time_per_move);
            stop.store(true, Ordering::Relaxed);
        });

        // await every worker, fast starters must not dominate the vote
        for _ in 0..workers {
            let tree = rx.recv().expect("a worker exited without a tree");
            for &(action, child) in &tree.nodes[ROOT].children {
                let visits = tree.nodes[child].visits;
                match stats.iter_mut().find(|(a, _)| *a == action) {
                    Some((_, total)) => *total += visits,
                    None => stats.push((action, visits)),
                }
            }
        }
    });

    let &(best, visits) = stats
        .iter()
        .max_by_key(|&&(_, visits)| visits)
        .expect("search explored no actions");
    debug!(
        "chose {} with {} visits across {} workers",
        best, visits, workers
    );

    to_move(view, best)
}

/// Translates the winning action into an externally typed move by inferring
/// the trump switch and announcement declarations from the live view.
fn to_move(view: &Game, action: Action) -> Move {
    let hand = view.hand();
    let seen = view.seen_cards().len();
    let nine_trump = Card::new(Rank::Nine, view.trump());

    // the simulator switches whenever it may, so the move must declare it
    let switch_trump_card = view.card_played().is_none()
        && !view.is_closed()
        && view.trump_card().is_some()
        && seen > 0
        && seen < 10
        && action.card != nine_trump
        && hand.contains(nine_trump);

    let is_announcement = view.card_played().is_none()
        && seen > 0
        && match action.card.marriage_partner() {
            Some(partner) => {
                hand.contains(partner)
                    || (switch_trump_card && view.trump_card() == Some(partner))
            }
            None => false,
        };

    Move {
        card: action.card,
        is_announcement,
        switch_trump_card,
        close_game: action.close_game,
    }
}

/// Agent wrapper around the search.
pub struct IsmctsAgent {
    config: SearchConfig,
}

impl IsmctsAgent {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }
}

impl Default for IsmctsAgent {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

impl Agent for IsmctsAgent {
    fn choose_move(&mut self, game: &Game) -> Move {
        choose_move(game, &self.config)
    }

    fn name(&self) -> String {
        format!(
            "ISMCTS, c: {}, budget: {:?}, workers: {:?}",
            self.config.exploration, self.config.time_per_move, self.config.workers
        )
    }
}
