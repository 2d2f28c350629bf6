pub mod agents;
pub mod algorithms;
pub mod game;

/// Collects the legal actions of a simulation state into a fresh vector.
#[macro_export]
macro_rules! actions {
    ( $x:expr ) => {{
        let mut temp_vec = Vec::new();
        $x.legal_actions(&mut temp_vec);
        temp_vec
    }};
}
