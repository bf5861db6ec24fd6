//! Catalog of chart types the dashboard can render.
//!
//! Identifiers are stable SCREAMING_SNAKE_CASE strings (`BAR_CLUSTERED`,
//! `LINE_SMOOTH`, ...) so that recommendations and saved chart configs can be
//! exchanged with the rendering side without a translation table.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

macro_rules! chart_types {
    ($($variant:ident => $id:literal, $family:ident;)+) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum ChartType {
            $(
                #[serde(rename = $id)]
                $variant,
            )+
        }

        impl ChartType {
            pub const ALL: &'static [ChartType] = &[$(ChartType::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(ChartType::$variant => $id,)+
                }
            }

            pub fn family(&self) -> ChartFamily {
                match self {
                    $(ChartType::$variant => ChartFamily::$family,)+
                }
            }
        }
    };
}

chart_types! {
    BarClustered => "BAR_CLUSTERED", Comparison;
    BarStacked => "BAR_STACKED", Comparison;
    BarPercent => "BAR_PERCENT", Comparison;
    BarHorizontal => "BAR_HORIZONTAL", Comparison;
    BarHorizontalStacked => "BAR_HORIZONTAL_STACKED", Comparison;
    BarHorizontalPercent => "BAR_HORIZONTAL_PERCENT", Comparison;
    BarWaterfall => "BAR_WATERFALL", Comparison;
    BarRange => "BAR_RANGE", Comparison;
    LineSmooth => "LINE_SMOOTH", Trend;
    LineStep => "LINE_STEP", Trend;
    LineStraight => "LINE_STRAIGHT", Trend;
    LineDashed => "LINE_DASHED", Trend;
    LineMultiAxis => "LINE_MULTI_AXIS", Trend;
    LineAreaMix => "LINE_AREA_MIX", Trend;
    AreaSmooth => "AREA_SMOOTH", Trend;
    AreaStep => "AREA_STEP", Trend;
    AreaStacked => "AREA_STACKED", Trend;
    AreaPercent => "AREA_PERCENT", Trend;
    AreaGradient => "AREA_GRADIENT", Trend;
    AreaReverse => "AREA_REVERSE", Trend;
    Pie => "PIE", PartToWhole;
    Donut => "DONUT", PartToWhole;
    PieSemi => "PIE_SEMI", PartToWhole;
    DonutSemi => "DONUT_SEMI", PartToWhole;
    Rose => "ROSE", PartToWhole;
    Sunburst => "SUNBURST", PartToWhole;
    RadialBar => "RADIAL_BAR", PartToWhole;
    Radar => "RADAR", PartToWhole;
    Scatter => "SCATTER", Distribution;
    Bubble => "BUBBLE", Distribution;
    ScatterLine => "SCATTER_LINE", Distribution;
    Treemap => "TREEMAP", Distribution;
    Heatmap => "HEATMAP", Distribution;
    ComboBarLine => "COMBO_BAR_LINE", Combination;
    ComboStackedLine => "COMBO_STACKED_LINE", Combination;
    ComboAreaLine => "COMBO_AREA_LINE", Combination;
    KpiSingle => "KPI_SINGLE", Indicator;
    KpiProgress => "KPI_PROGRESS", Indicator;
    KpiBullet => "KPI_BULLET", Indicator;
    Table => "TABLE", Indicator;
    CardList => "CARD_LIST", Indicator;
    Gauge => "GAUGE", Indicator;
    Sparkline => "SPARKLINE", Indicator;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartFamily {
    Comparison,
    Trend,
    PartToWhole,
    Distribution,
    Combination,
    Indicator,
}

impl ChartFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartFamily::Comparison => "comparison",
            ChartFamily::Trend => "trend",
            ChartFamily::PartToWhole => "part-to-whole",
            ChartFamily::Distribution => "distribution",
            ChartFamily::Combination => "combination",
            ChartFamily::Indicator => "indicator",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown chart type '{0}'")]
pub struct UnknownChartType(pub String);

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartType {
    type Err = UnknownChartType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().replace('-', "_");
        ChartType::ALL
            .iter()
            .copied()
            .find(|chart| chart.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| UnknownChartType(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_parse_case_insensitively() {
        assert_eq!("bar_clustered".parse(), Ok(ChartType::BarClustered));
        assert_eq!("kpi-single".parse(), Ok(ChartType::KpiSingle));
        assert_eq!(
            "histogram".parse::<ChartType>(),
            Err(UnknownChartType("histogram".to_string()))
        );
    }

    #[test]
    fn every_variant_roundtrips_its_identifier() {
        for chart in ChartType::ALL {
            assert_eq!(chart.as_str().parse::<ChartType>(), Ok(*chart));
        }
        assert_eq!(ChartType::ALL.len(), 43);
    }

    #[test]
    fn serializes_as_identifier_string() {
        let json = serde_json::to_string(&ChartType::LineSmooth).expect("serialize");
        assert_eq!(json, "\"LINE_SMOOTH\"");
        assert_eq!(ChartType::Treemap.family(), ChartFamily::Distribution);
    }
}
