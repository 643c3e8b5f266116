use std::collections::HashSet;

use kdam::tqdm;
use rand::prelude::*;
use scenprep_core::{
    document::{
        Attribute, AttributeBag, Person, Plan, PlanElement, Population, JAVA_BOOLEAN,
        JAVA_INTEGER, JAVA_LONG,
    },
    time::ClockTime,
};
use serde::Serialize;

use crate::{
    config::PopulationConfig,
    poi::{PoiPools, PointOfInterest},
    sampling::{self, AGENT_ID_PREFIX},
    PopulationError,
};

pub const PERSON_VEHICLES_CLASS: &str = "org.matsim.vehicles.PersonVehicles";

/// per-mode vehicle ids of one agent, serialized into the `vehicles` attribute.
#[derive(Debug, Serialize)]
struct PersonVehicles {
    car: String,
    truck: String,
    freight: String,
    ride: String,
    bike: String,
}

impl PersonVehicles {
    fn new(base: &str) -> PersonVehicles {
        let id = |mode: &str| format!("bb_{base}_{mode}");
        PersonVehicles {
            car: id("car"),
            truck: id("truck"),
            freight: id("freight"),
            ride: id("ride"),
            bike: id("bike"),
        }
    }
}

pub struct PopulationGenerator<'a> {
    config: &'a PopulationConfig,
    pools: &'a PoiPools,
    rng: StdRng,
    used_ids: HashSet<String>,
}

impl<'a> PopulationGenerator<'a> {
    /// checks that the POI pools can serve every plan before any agent is drawn.
    pub fn new(
        config: &'a PopulationConfig,
        pools: &'a PoiPools,
    ) -> Result<PopulationGenerator<'a>, PopulationError> {
        if pools.anchors.is_empty() {
            return Err(PopulationError::Configuration(format!(
                "no points of interest of anchor types [{}]",
                config.anchor_types.join(", ")
            )));
        }
        if pools.visits.len() < config.visits {
            return Err(PopulationError::Configuration(format!(
                "{} visits per agent requested but only {} visit locations available",
                config.visits,
                pools.visits.len()
            )));
        }
        if config.visits > 0 && pools.total_visit_gravity() <= 0.0 {
            return Err(PopulationError::Configuration(String::from(
                "total gravity of visit locations must be positive",
            )));
        }
        Ok(PopulationGenerator {
            config,
            pools,
            rng: sampling::rng_from_seed(config.seed),
            used_ids: HashSet::new(),
        })
    }

    pub fn generate(&mut self, agents: usize) -> Result<Population, PopulationError> {
        let mut persons = Vec::with_capacity(agents);
        for _ in tqdm!(0..agents, desc = "generating tourist agents") {
            persons.push(self.person()?);
        }
        eprintln!();
        Ok(Population { persons })
    }

    pub fn person(&mut self) -> Result<Person, PopulationError> {
        let id = self.unique_id();
        let attributes = self.attributes(&id)?;
        let plan = self.plan()?;
        Ok(Person {
            id,
            attributes,
            plan,
        })
    }

    fn unique_id(&mut self) -> String {
        loop {
            let id = sampling::agent_id(&mut self.rng);
            if self.used_ids.insert(id.clone()) {
                return id;
            }
            log::debug!("agent id {id} drawn twice, drawing again");
        }
    }

    fn pick<'o, T>(&mut self, options: &'o [T], name: &str) -> Result<&'o T, PopulationError> {
        options
            .choose(&mut self.rng)
            .ok_or_else(|| PopulationError::Sampling(format!("no {name} to choose from")))
    }

    fn attributes(&mut self, id: &str) -> Result<AttributeBag, PopulationError> {
        let config = self.config;
        let fixed = &config.fixed_attributes;
        let age = sampling::normal(&mut self.rng, config.age.mean, config.age.std_dev) as i64;
        let sex = self.pick(&config.sex_options, "sex options")?.clone();
        let income = sampling::round_to(
            sampling::normal(&mut self.rng, config.income.mean, config.income.std_dev),
            2,
        );
        let employment = self
            .pick(&config.employment_options, "employment options")?
            .clone();
        let household_size = *self.pick(&config.household_sizes, "household sizes")?;
        let equivalent_size = sampling::round_to(
            self.rng.random_range(
                config.household_equivalent_size_min..=config.household_equivalent_size_max,
            ),
            1,
        );
        let base = id.trim_start_matches(AGENT_ID_PREFIX).to_lowercase();
        let vehicles = serde_json::to_string(&PersonVehicles::new(&base))
            .map_err(|e| PopulationError::Sampling(format!("vehicle ids of {id}: {e}")))?;

        Ok(AttributeBag(vec![
            Attribute::new("age", JAVA_INTEGER, age),
            Attribute::string("sex", sex),
            Attribute::double("income", income),
            Attribute::string("employment", employment),
            Attribute::new("employed", JAVA_BOOLEAN, fixed.employed),
            Attribute::string("carAvail", &fixed.car_avail),
            Attribute::string("bikeAvail", &fixed.bike_avail),
            Attribute::string("ptAboAvail", &fixed.pt_abo_avail),
            Attribute::string("hasLicense", &fixed.has_license),
            Attribute::string("economic_status", &fixed.economic_status),
            Attribute::new("restricted_mobility", JAVA_BOOLEAN, fixed.restricted_mobility),
            Attribute::new("household_size", JAVA_INTEGER, household_size),
            Attribute::double("household_equivalent_size", equivalent_size),
            Attribute::string("household_type", &fixed.household_type),
            Attribute::new("gem", JAVA_INTEGER, fixed.gem),
            Attribute::new("ars", JAVA_LONG, fixed.ars),
            Attribute::new("RegioStaR7", JAVA_INTEGER, fixed.regio_star7),
            Attribute::string("subpopulation", &fixed.subpopulation),
            Attribute::new("vehicles", PERSON_VEHICLES_CLASS, vehicles),
        ]))
    }

    /// anchor, then the weighted visits, then an anchor without end time. every
    /// activity but the last is followed by a leg.
    fn plan(&mut self) -> Result<Plan, PopulationError> {
        let config = self.config;
        let pools = self.pools;
        let allowance = ClockTime(config.travel_allowance_minutes * 60);

        let hour = self
            .rng
            .random_range(config.start_hour_min..=config.start_hour_max);
        let minute = *self.pick(&config.start_minutes, "start minutes")?;
        let start = ClockTime::checked_from_hms(hour, minute, 0).ok_or_else(|| {
            PopulationError::Sampling(format!("start time {hour}:{minute} is out of range"))
        })?;

        let mut elements = vec![];
        let first = self.pick(&pools.anchors, "anchor locations")?;
        elements.push(activity(first, Some(later(start, allowance))));
        elements.push(self.leg());

        let visits = sampling::sample_weighted_without_replacement(
            &mut self.rng,
            &pools.visits,
            config.visits,
            |p| p.gravity,
        )?;
        let mut end_time = start;
        for visit in visits {
            end_time = later(
                end_time,
                ClockTime(allowance.seconds() + visit.duration_minutes() * 60),
            );
            elements.push(activity(visit, Some(end_time)));
            elements.push(self.leg());
        }

        let last = self.pick(&pools.anchors, "anchor locations")?;
        elements.push(activity(last, None));
        Ok(Plan {
            selected: true,
            elements,
        })
    }

    fn leg(&self) -> PlanElement {
        PlanElement::Leg {
            mode: self.config.leg_mode.clone(),
        }
    }
}

fn later(time: ClockTime, delta: ClockTime) -> ClockTime {
    ClockTime(time.seconds() + delta.seconds())
}

fn activity(poi: &PointOfInterest, end_time: Option<ClockTime>) -> PlanElement {
    PlanElement::Activity {
        activity_type: poi.poi_type.clone(),
        x: poi.x_coord,
        y: poi.y_coord,
        end_time,
    }
}
