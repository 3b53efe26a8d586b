use std::fmt;

use serde::{Deserialize, Serialize};

use crate::observation::{Embedding, Observation};

/// Stable person identifier. Assigned once, in increasing order, and never
/// reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(pub u32);

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "person:{:03}", self.0)
    }
}

/// A resolved identity: two or more observations believed to show the same
/// face.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub(crate) id: PersonId,
    pub(crate) observations: Vec<Observation>,
}

impl Person {
    pub(crate) fn found(id: PersonId, first: Observation, second: Observation) -> Self {
        Self {
            id,
            observations: vec![first, second],
        }
    }

    pub fn id(&self) -> PersonId {
        self.id
    }

    /// The embedding new observations are compared against: the founding
    /// observation's, for the whole life of the person.
    pub fn representative(&self) -> &Embedding {
        &self.observations[0].embedding
    }

    /// Observations in detection order.
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Always false: a person is founded with two observations.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first_seen(&self) -> f64 {
        self.observations[0].timestamp
    }

    pub fn last_seen(&self) -> f64 {
        self.observations[self.observations.len() - 1].timestamp
    }
}

impl fmt::Debug for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Person")
            .field("id", &self.id)
            .field("observations", &self.observations.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(t: f64, v: f32) -> Observation {
        Observation::new(t, format!("t{t}"), Embedding::new(vec![v, 0.0]).unwrap())
    }

    #[test]
    fn id_format() {
        assert_eq!(PersonId(1).to_string(), "person:001");
        assert_eq!(PersonId(42).to_string(), "person:042");
        assert_eq!(PersonId(1234).to_string(), "person:1234");
    }

    #[test]
    fn representative_is_first_observation() {
        let mut p = Person::found(PersonId(1), obs(0.0, 1.0), obs(1.0, 2.0));
        p.observations.push(obs(2.0, 3.0));
        assert_eq!(p.representative().as_slice(), &[1.0, 0.0]);
        assert_eq!(p.len(), 3);
        assert_eq!(p.first_seen(), 0.0);
        assert_eq!(p.last_seen(), 2.0);
        assert!(!p.is_empty());
    }
}
