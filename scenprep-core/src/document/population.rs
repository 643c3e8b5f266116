use std::{io::Write, path::Path};

use roxmltree::Node;

use super::{write_document, xml_read_ops as xr, AttributeBag, XmlWriter};
use crate::{time::ClockTime, util::fs, DocumentError};

pub const POPULATION_DTD: &str = "http://www.matsim.org/files/dtd/population_v6.dtd";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Population {
    pub persons: Vec<Person>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub id: String,
    pub attributes: AttributeBag,
    pub plan: Plan,
}

/// a daily plan, alternating activities and legs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    pub selected: bool,
    pub elements: Vec<PlanElement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlanElement {
    Activity {
        activity_type: String,
        x: f64,
        y: f64,
        end_time: Option<ClockTime>,
    },
    Leg {
        mode: String,
    },
}

impl Plan {
    pub fn activities(&self) -> impl Iterator<Item = &PlanElement> {
        self.elements
            .iter()
            .filter(|e| matches!(e, PlanElement::Activity { .. }))
    }
}

impl Population {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Population, DocumentError> {
        let contents = fs::read_to_string(path.as_ref())?;
        Population::from_xml_str(&contents).map_err(|e| DocumentError::ReadError {
            path: path.as_ref().to_owned(),
            message: e.to_string(),
        })
    }

    /// reads the selected plan of each person (or the first one if none is
    /// marked selected).
    pub fn from_xml_str(xml: &str) -> Result<Population, DocumentError> {
        let doc = xr::parse_document(xml)?;
        let root = xr::expect_root(&doc, "population")?;
        let persons = xr::children(&root, "person")
            .map(|n| read_person(&n))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Population { persons })
    }

    /// writes the population document. a `.gz` path is gzip-compressed.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), DocumentError> {
        write_document(path, |writer| self.to_xml(writer))
    }

    pub fn to_xml<W: Write>(&self, writer: &mut XmlWriter<W>) -> std::io::Result<()> {
        writer.declaration()?;
        writer.doctype("population", POPULATION_DTD)?;
        writer.start("population", &[])?;
        for person in self.persons.iter() {
            writer.start("person", &[("id", person.id.clone())])?;
            person.attributes.write(writer)?;
            let selected = if person.plan.selected { "yes" } else { "no" };
            writer.start("plan", &[("selected", String::from(selected))])?;
            for element in person.plan.elements.iter() {
                write_element(element, writer)?;
            }
            writer.end("plan")?;
            writer.end("person")?;
        }
        writer.end("population")
    }
}

fn read_person(node: &Node) -> Result<Person, DocumentError> {
    let plans = xr::children(node, "plan").collect::<Vec<_>>();
    let plan_node = plans
        .iter()
        .find(|p| p.attribute("selected") == Some("yes"))
        .or_else(|| plans.first());
    let plan = match plan_node {
        None => Plan::default(),
        Some(p) => {
            let elements = p
                .children()
                .filter(|n| n.is_element())
                .filter_map(|n| match n.tag_name().name() {
                    "activity" => Some(read_activity(&n)),
                    "leg" => Some(
                        xr::required_attr(&n, "mode").map(|mode| PlanElement::Leg {
                            mode: mode.to_string(),
                        }),
                    ),
                    _ => None,
                })
                .collect::<Result<Vec<_>, _>>()?;
            Plan {
                selected: p.attribute("selected") == Some("yes"),
                elements,
            }
        }
    };
    Ok(Person {
        id: xr::required_attr(node, "id")?.to_string(),
        attributes: AttributeBag::from_parent(node)?,
        plan,
    })
}

fn read_activity(node: &Node) -> Result<PlanElement, DocumentError> {
    Ok(PlanElement::Activity {
        activity_type: xr::required_attr(node, "type")?.to_string(),
        x: xr::parse_required_attr(node, "x")?,
        y: xr::parse_required_attr(node, "y")?,
        end_time: xr::parse_time_attr(node, "end_time")?,
    })
}

fn write_element<W: Write>(element: &PlanElement, writer: &mut XmlWriter<W>) -> std::io::Result<()> {
    match element {
        PlanElement::Activity {
            activity_type,
            x,
            y,
            end_time,
        } => {
            let mut attrs = vec![
                ("type", activity_type.clone()),
                ("x", x.to_string()),
                ("y", y.to_string()),
            ];
            if let Some(end) = end_time {
                attrs.push(("end_time", end.to_string()));
            }
            writer.empty("activity", &attrs)
        }
        PlanElement::Leg { mode } => writer.empty("leg", &[("mode", mode.clone())]),
    }
}
