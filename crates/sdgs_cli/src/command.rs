//! Parsing of console lines into driver events.

use sdgs_core::{
    Event, Measure, MeasurePatch, Measures, RecordDraft, RecordId, RegionSelector, ViewMode,
};

pub const HELP: &str = "commands: next | prev | years <lo> <hi> | years all | region <name|all> \
| view <records|dashboard> | edit <id> | cancel | submit <id> [ikk=..] [ppm=..] [tpt=..] \
| create <region> <year> <ikk> <ppm> <tpt> | delete <id> | refresh | help | quit";

#[derive(Debug, PartialEq)]
pub enum Line {
    Event(Event),
    Help,
    Quit,
    Empty,
}

pub fn parse_line(line: &str) -> Result<Line, String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some((&head, args)) = tokens.split_first() else {
        return Ok(Line::Empty);
    };

    let event = match (head, args) {
        ("quit" | "exit", []) => return Ok(Line::Quit),
        ("help", []) => return Ok(Line::Help),
        ("next", []) => Event::NextPage,
        ("prev", []) => Event::PreviousPage,
        ("refresh", []) => Event::Refresh,
        ("cancel", []) => Event::CancelEdit,
        ("years", ["all"]) => Event::ResetYearRange,
        ("years", [min, max]) => Event::SetYearRange {
            min: parse_number(min, "year")?,
            max: parse_number(max, "year")?,
        },
        ("region", ["all"]) => Event::SelectRegion(RegionSelector::All),
        ("region", name) if !name.is_empty() => {
            Event::SelectRegion(RegionSelector::Region(name.join(" ")))
        }
        ("view", ["records"]) => Event::ShowView(ViewMode::Records),
        ("view", ["dashboard"]) => Event::ShowView(ViewMode::Dashboard),
        ("edit", id) if !id.is_empty() => Event::StartEdit(parse_id(&id.join(" "))?),
        ("delete", id) if !id.is_empty() => Event::Delete(parse_id(&id.join(" "))?),
        ("submit", args) if !args.is_empty() => {
            let split = args
                .iter()
                .position(|token| token.contains('='))
                .unwrap_or(args.len());
            let (id, fields) = args.split_at(split);
            Event::SubmitEdit {
                id: parse_id(&id.join(" "))?,
                patch: parse_patch(fields)?,
            }
        }
        ("create", [region @ .., year, ikk, ppm, tpt]) if !region.is_empty() => {
            Event::Create(RecordDraft::new(
                region.join(" "),
                parse_number(year, "year")?,
                Measures::complete(
                    parse_number(ikk, "ikk")?,
                    parse_number(ppm, "ppm")?,
                    parse_number(tpt, "tpt")?,
                ),
            ))
        }
        _ => return Err(format!("unrecognized command `{}`; try `help`", line.trim())),
    };

    Ok(Line::Event(event))
}

fn parse_id(value: &str) -> Result<RecordId, String> {
    RecordId::parse(value).map_err(|err| err.to_string())
}

fn parse_number<T: std::str::FromStr>(value: &str, field: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("invalid {field} value `{value}`"))
}

fn parse_patch(fields: &[&str]) -> Result<MeasurePatch, String> {
    let mut patch = MeasurePatch::default();
    for field in fields {
        let (key, value) = field
            .split_once('=')
            .ok_or_else(|| format!("expected key=value, got `{field}`"))?;
        let measure = match key {
            "ikk" => Measure::PovertySeverityIndex,
            "ppm" => Measure::PovertyPopulationPct,
            "tpt" => Measure::UnemploymentRate,
            other => return Err(format!("unknown measure `{other}`; expected ikk|ppm|tpt")),
        };
        patch.set(measure, parse_number(value, key)?);
    }
    Ok(patch)
}
