use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

use crate::roster::{Person, Role};

/// Worship leader priority; whoever is picked moves to the back
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rotation {
    order: VecDeque<String>,
}

impl Rotation {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { order: names.into_iter().map(Into::into).collect() }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.order.iter().position(|n| n == name)
    }

    fn send_to_back(&mut self, name: &str) {
        if let Some(idx) = self.position(name) {
            if let Some(picked) = self.order.remove(idx) {
                self.order.push_back(picked);
            }
        }
    }
}

/// Picks one person out of the eligible set for a role
#[derive(Debug, Clone, Default)]
pub struct CandidateSelector {
    rotation: Rotation,
}

impl CandidateSelector {
    pub fn new(rotation: Rotation) -> Self {
        Self { rotation }
    }

    pub fn rotation(&self) -> &Rotation {
        &self.rotation
    }

    /// Returns `None` when nobody is eligible; the caller records a gap
    pub fn select<'p, R>(&mut self, eligible: &[&'p Person], role: &Role, rng: &mut R) -> Option<&'p Person>
    where
        R: Rng + ?Sized,
    {
        if eligible.is_empty() {
            return None;
        }
        if role.uses_rotation() {
            if let Some(person) = self.next_in_rotation(eligible) {
                info!(person = %person.name, "next worship leader selected from rotation");
                return Some(person);
            }
            debug!("no eligible worship leader in the rotation, picking among unranked members");
        }
        eligible.choose(rng).copied()
    }

    fn next_in_rotation<'p>(&mut self, eligible: &[&'p Person]) -> Option<&'p Person> {
        let picked = eligible
            .iter()
            .filter_map(|p| self.rotation.position(&p.name).map(|pos| (pos, *p)))
            .min_by_key(|(pos, _)| *pos)
            .map(|(_, p)| p)?;
        self.rotation.send_to_back(&picked.name);
        Some(picked)
    }
}
