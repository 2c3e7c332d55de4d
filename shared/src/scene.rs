//! The finished choropleth drawing, computed once from the two datasets.

use thiserror::Error;

use crate::colors::{self, NO_DATA_FILL, REDS_7, Rgb, STATE_BORDER_STROKE};
use crate::education::{CountyId, EducationRecord, JoinIndex};
use crate::path;
use crate::scale::{BUCKETS, LinearScale, ScaleError, ThresholdScale, round_half_up};
use crate::topology::{Topology, TopologyError, interior};

pub const COUNTIES_OBJECT: &str = "counties";
pub const STATES_OBJECT: &str = "states";

#[derive(Debug, Error)]
pub enum SceneError {
    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Scale(#[from] ScaleError),

    #[error("county geometry #{index} has no usable FIPS id")]
    MissingCountyId { index: usize },
}

/// Fixed sizes, offsets and colors of the drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneLayout {
    pub width: f64,
    pub height: f64,
    pub title: String,
    pub description: String,
    pub palette: [Rgb; BUCKETS],
    pub no_data_fill: Rgb,
    pub border_stroke: Rgb,
    pub legend_width: f64,
    pub legend_height: f64,
    pub tick_size: f64,
}

impl Default for SceneLayout {
    fn default() -> Self {
        Self {
            width: 950.0,
            height: 600.0,
            title: "United States Educational Attainment".to_string(),
            description: "Percentage of adults age 25 and older with a bachelor's degree or higher (2010-2014)".to_string(),
            palette: REDS_7,
            no_data_fill: NO_DATA_FILL,
            border_stroke: STATE_BORDER_STROKE,
            legend_width: 200.0,
            legend_height: 10.0,
            tick_size: 10.0,
        }
    }
}

impl SceneLayout {
    /// Top-left corner of the legend inside the SVG.
    pub fn legend_origin(&self) -> (f64, f64) {
        (self.width * 0.65, 40.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountyShape {
    pub id: CountyId,
    pub path: String,
    pub fill: String,
    /// `None` when the county has no education record.
    pub education: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendSwatch {
    pub x: f64,
    pub width: f64,
    pub height: f64,
    pub fill: String,
    pub extent: (f64, f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendTick {
    pub x: f64,
    pub value: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    pub origin: (f64, f64),
    pub swatches: Vec<LegendSwatch>,
    pub ticks: Vec<LegendTick>,
    pub tick_size: f64,
}

impl Legend {
    fn build(scale: &ThresholdScale, layout: &SceneLayout) -> Self {
        let bar = layout.legend_width / BUCKETS as f64;
        let swatches = (0..BUCKETS)
            .filter_map(|bucket| {
                let extent = scale.invert_extent(bucket)?;
                Some(LegendSwatch {
                    x: bucket as f64 * bar,
                    width: bar,
                    height: layout.legend_height,
                    fill: colors::hex_css(scale.palette()[bucket]),
                    extent,
                })
            })
            .collect();

        let axis = LinearScale::new(scale.domain(), (0.0, layout.legend_width));
        let ticks = scale
            .boundaries()
            .iter()
            .map(|&value| LegendTick {
                x: axis.map(value),
                value,
                label: format!("{}%", round_half_up(value)),
            })
            .collect();

        Self {
            origin: layout.legend_origin(),
            swatches,
            ticks,
            tick_size: layout.tick_size,
        }
    }
}

/// Everything the renderer draws, plus the data the hover handler needs.
#[derive(Debug, Clone)]
pub struct MapScene {
    pub layout: SceneLayout,
    pub counties: Vec<CountyShape>,
    /// Path data for internal state borders.
    pub state_borders: String,
    pub legend: Legend,
    pub scale: ThresholdScale,
    /// Counties drawn with the no-data fill.
    pub unjoined: usize,
    index: JoinIndex,
}

impl MapScene {
    pub fn build(
        topology: &Topology,
        records: Vec<EducationRecord>,
        layout: SceneLayout,
    ) -> Result<Self, SceneError> {
        let index = JoinIndex::build(records);
        let scale =
            ThresholdScale::from_values(index.iter().map(|r| r.bachelors_or_higher), layout.palette)?;

        let features = topology.feature(COUNTIES_OBJECT)?;
        let mut counties = Vec::with_capacity(features.len());
        let mut unjoined = 0;
        for (idx, feature) in features.iter().enumerate() {
            let id = feature
                .county_id()
                .ok_or(SceneError::MissingCountyId { index: idx })?;
            let education = index.get(id).map(|r| r.bachelors_or_higher);
            let fill = match education {
                Some(value) => colors::hex_css(scale.color_of(value)),
                None => {
                    unjoined += 1;
                    colors::hex_css(layout.no_data_fill)
                }
            };
            counties.push(CountyShape {
                id,
                path: path::geometry_path(&feature.geometry),
                fill,
                education,
            });
        }

        let borders = topology.mesh(STATES_OBJECT, Some(interior))?;
        let state_borders = path::lines_path(&borders);
        let legend = Legend::build(&scale, &layout);

        Ok(Self {
            layout,
            counties,
            state_borders,
            legend,
            scale,
            unjoined,
            index,
        })
    }

    /// Education record for a county, looked up through the join index.
    pub fn record(&self, id: CountyId) -> Option<&EducationRecord> {
        self.index.get(id)
    }

    /// Education records loaded, duplicates included.
    pub fn record_count(&self) -> usize {
        self.index.len()
    }

    pub fn border_stroke(&self) -> String {
        colors::hex_css(self.layout.border_stroke)
    }
}
