/// Synthetic directions
///
/// Not a routing engine: produces a fixed per-mode template step list scaled
/// by the real great-circle distance. Steps and totals are scaled
/// independently from the same template, so step values approximate the
/// totals rather than summing to them exactly.
use crate::models::{DirectionStep, Directions, TravelMode};
use crate::services::distance::{distance_km, km_to_miles};

/// Templates are calibrated for a roughly 2 km trip
const REFERENCE_DISTANCE_KM: f64 = 2.0;

/// Damping band so degenerate trips don't produce degenerate numbers
const MIN_SCALE: f64 = 0.5;
const MAX_SCALE: f64 = 2.0;

struct StepTemplate {
    instruction: &'static str,
    miles: f64,
    minutes: f64,
}

const DRIVING_TEMPLATE: &[StepTemplate] = &[
    StepTemplate {
        instruction: "Head north on Main St",
        miles: 0.5,
        minutes: 2.0,
    },
    StepTemplate {
        instruction: "Turn right onto Oak Ave",
        miles: 0.8,
        minutes: 3.0,
    },
    StepTemplate {
        instruction: "Merge onto the highway",
        miles: 1.5,
        minutes: 4.0,
    },
    StepTemplate {
        instruction: "Take the downtown exit and arrive at your destination",
        miles: 0.4,
        minutes: 2.0,
    },
];

const WALKING_TEMPLATE: &[StepTemplate] = &[
    StepTemplate {
        instruction: "Head north on Main St",
        miles: 0.3,
        minutes: 6.0,
    },
    StepTemplate {
        instruction: "Turn left onto the riverside path",
        miles: 0.6,
        minutes: 12.0,
    },
    StepTemplate {
        instruction: "Continue straight to your destination",
        miles: 0.4,
        minutes: 8.0,
    },
];

const TRANSIT_TEMPLATE: &[StepTemplate] = &[
    StepTemplate {
        instruction: "Walk to the nearest station",
        miles: 0.2,
        minutes: 4.0,
    },
    StepTemplate {
        instruction: "Take the Blue Line toward downtown",
        miles: 2.1,
        minutes: 12.0,
    },
    StepTemplate {
        instruction: "Walk from the station to your destination",
        miles: 0.3,
        minutes: 6.0,
    },
];

/// Bicycling has no dedicated template and falls back to the driving one
/// while keeping its mode tag
fn template_for(mode: TravelMode) -> &'static [StepTemplate] {
    match mode {
        TravelMode::Driving | TravelMode::Bicycling => DRIVING_TEMPLATE,
        TravelMode::Walking => WALKING_TEMPLATE,
        TravelMode::Transit => TRANSIT_TEMPLATE,
    }
}

/// Synthesizes directions between two points for a validated travel mode
pub fn synthesize(
    origin_lat: f64,
    origin_lng: f64,
    destination_lat: f64,
    destination_lng: f64,
    mode: TravelMode,
) -> Directions {
    let distance = distance_km(origin_lat, origin_lng, destination_lat, destination_lng);
    let scale = (distance / REFERENCE_DISTANCE_KM).clamp(MIN_SCALE, MAX_SCALE);

    let template = template_for(mode);

    let steps: Vec<DirectionStep> = template
        .iter()
        .map(|step| DirectionStep {
            instruction: step.instruction.to_string(),
            distance: format!("{:.1} mi", step.miles * scale),
            duration: format_minutes((step.minutes * scale).round() as u64),
        })
        .collect();

    let template_minutes: f64 = template.iter().map(|s| s.minutes).sum();

    Directions {
        steps,
        total_distance: format!("{:.1} mi", km_to_miles(distance)),
        total_duration: format_minutes((template_minutes * scale).round() as u64),
        mode: mode.to_string(),
    }
}

/// Formats minutes as "N min" below an hour, otherwise "Hh Mm" (minutes
/// suffix omitted on the exact hour)
fn format_minutes(minutes: u64) -> String {
    if minutes < 60 {
        format!("{} min", minutes)
    } else {
        let hours = minutes / 60;
        let rest = minutes % 60;
        if rest == 0 {
            format!("{}h", hours)
        } else {
            format!("{}h {}m", hours, rest)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // About 4 km east of the origin at this latitude
    const FOUR_KM_LNG_DELTA: f64 = 0.03597;

    #[test]
    fn test_identical_points_clamps_scale_to_half() {
        let directions = synthesize(37.0, -122.0, 37.0, -122.0, TravelMode::Walking);

        assert_eq!(directions.total_distance, "0.0 mi");
        assert_eq!(directions.mode, "walking");
        // Walking template first step is 6 min; clamped scale 0.5 halves it
        assert_eq!(directions.steps[0].duration, "3 min");
        assert_eq!(directions.steps.len(), WALKING_TEMPLATE.len());
    }

    #[test]
    fn test_scale_doubles_at_clamp_boundary_and_beyond() {
        // ~4 km trip lands exactly on the clamp ceiling (4.0 / 2.0 = 2.0)
        let at_boundary = synthesize(0.0, 0.0, 0.0, FOUR_KM_LNG_DELTA, TravelMode::Driving);
        // A far longer trip is clamped to the same ceiling
        let beyond = synthesize(0.0, 0.0, 0.0, 10.0 * FOUR_KM_LNG_DELTA, TravelMode::Driving);

        // Driving template first step is 0.5 mi; doubled in both cases
        assert_eq!(at_boundary.steps[0].distance, "1.0 mi");
        assert_eq!(beyond.steps[0].distance, "1.0 mi");
        for (a, b) in at_boundary.steps.iter().zip(&beyond.steps) {
            assert_eq!(a.distance, b.distance);
            assert_eq!(a.duration, b.duration);
        }
    }

    #[test]
    fn test_bicycling_falls_back_to_driving_template_with_own_tag() {
        let bike = synthesize(37.0, -122.0, 37.1, -122.0, TravelMode::Bicycling);
        let drive = synthesize(37.0, -122.0, 37.1, -122.0, TravelMode::Driving);

        assert_eq!(bike.mode, "bicycling");
        assert_eq!(
            bike.steps[0].instruction,
            drive.steps[0].instruction
        );
        assert_eq!(bike.steps.len(), drive.steps.len());
    }

    #[test]
    fn test_total_duration_scales_from_template_total() {
        // Walking template totals 26 min; scale clamped to 0.5 gives 13
        let directions = synthesize(37.0, -122.0, 37.0, -122.0, TravelMode::Walking);
        assert_eq!(directions.total_duration, "13 min");
    }

    #[test]
    fn test_format_minutes_boundaries() {
        assert_eq!(format_minutes(0), "0 min");
        assert_eq!(format_minutes(59), "59 min");
        assert_eq!(format_minutes(60), "1h");
        assert_eq!(format_minutes(90), "1h 30m");
        assert_eq!(format_minutes(120), "2h");
        assert_eq!(format_minutes(125), "2h 5m");
    }

    #[test]
    fn test_transit_template_selected() {
        let directions = synthesize(40.7, -74.0, 40.75, -74.0, TravelMode::Transit);
        assert_eq!(directions.mode, "transit");
        assert!(directions.steps[1].instruction.contains("Blue Line"));
    }
}
