/*
 * Colony Module
 *
 * Food and larva counters for the colony scenario. Balls delivered to the
 * nest become food, food is spent laying eggs (larvae) and hatching them into
 * new agents. Failed operations leave the counters untouched.
 */

use crate::error::{SwarmError, SwarmResult};
use crate::params::ColonyParams;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Colony {
    pub food: u32,
    pub larvae: u32,
    pub hatched: u32,
    pub delivered: u32,
}

impl Colony {
    pub fn new(params: &ColonyParams) -> Self {
        Self {
            food: params.starting_food,
            ..Self::default()
        }
    }

    fn spend(&mut self, needed: u32) -> SwarmResult<()> {
        if self.food < needed {
            return Err(SwarmError::InsufficientFood {
                needed,
                available: self.food,
            });
        }
        self.food -= needed;
        Ok(())
    }

    pub fn lay_egg(&mut self, params: &ColonyParams) -> SwarmResult<()> {
        self.spend(params.egg_food_cost)?;
        self.larvae += 1;
        Ok(())
    }

    // Check every precondition before touching any counter
    pub fn hatch(&mut self, params: &ColonyParams, population: usize) -> SwarmResult<()> {
        if population >= params.max_agents {
            return Err(SwarmError::PopulationCap(params.max_agents));
        }
        if self.larvae == 0 {
            return Err(SwarmError::NoLarvae);
        }
        self.spend(params.hatch_food_cost)?;
        self.larvae -= 1;
        self.hatched += 1;
        Ok(())
    }

    pub fn deliver(&mut self, params: &ColonyParams) {
        self.food = self.food.saturating_add(params.food_per_delivery);
        self.delivered += 1;
    }
}
