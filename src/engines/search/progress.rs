use std::sync::mpsc::Sender;

/// Observer of the stochastic optimizer's outer loop
pub trait ProgressCallback: Send {
    fn on_round_start(&mut self, round: usize);
    fn on_round_complete(&mut self, round: usize, round_fitness: f64, best_fitness: f64);
    fn on_new_best(&mut self, round: usize, fitness: f64);
}

pub struct LogProgressCallback;

impl ProgressCallback for LogProgressCallback {
    fn on_round_start(&mut self, round: usize) {
        log::debug!("Round {} starting...", round);
    }

    fn on_round_complete(&mut self, round: usize, round_fitness: f64, best_fitness: f64) {
        log::debug!(
            "Round {} complete. Fitness: {:.6}, best: {:.6}",
            round,
            round_fitness,
            best_fitness
        );
    }

    fn on_new_best(&mut self, round: usize, fitness: f64) {
        log::info!("New best composition at round {}: {:.6}", round, fitness);
    }
}

/// Forwards progress to another thread
pub struct ChannelProgressCallback {
    sender: Sender<ProgressMessage>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressMessage {
    RoundStart(usize),
    RoundComplete {
        round: usize,
        round_fitness: f64,
        best_fitness: f64,
    },
    NewBest {
        round: usize,
        fitness: f64,
    },
}

impl ChannelProgressCallback {
    pub fn new(sender: Sender<ProgressMessage>) -> Self {
        Self { sender }
    }
}

impl ProgressCallback for ChannelProgressCallback {
    fn on_round_start(&mut self, round: usize) {
        let _ = self.sender.send(ProgressMessage::RoundStart(round));
    }

    fn on_round_complete(&mut self, round: usize, round_fitness: f64, best_fitness: f64) {
        let _ = self.sender.send(ProgressMessage::RoundComplete {
            round,
            round_fitness,
            best_fitness,
        });
    }

    fn on_new_best(&mut self, round: usize, fitness: f64) {
        let _ = self.sender.send(ProgressMessage::NewBest { round, fitness });
    }
}
