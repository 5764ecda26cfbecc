//! CLI entry point: `run <scenario_number> [--cycle crop|calendar] [--directory PATH]`,
//! matching `Original/drought_proofing_tool.py`'s `-s/-c/-d` options (spec.md
//! §6, SPEC_FULL.md §13). Scenario 0 is the baseline.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use serde::Serialize;

use drought_proofing_wb::config::{Climate, HydrologicSoilClass, SoilTexture};
use drought_proofing_wb::core::aggregate::{Season, YearType};
use drought_proofing_wb::core::curve_number::{CnInterventionAreas, CnInterventionReductions, CropCnDatabase};
use drought_proofing_wb::core::efficiency::CropIntervention;
use drought_proofing_wb::core::phenology::{round_stage_length, CropPhenology};
use drought_proofing_wb::core::soil::{SoilConservationPractice, SoilLayer, SoilProfile};
use drought_proofing_wb::core::storage;
use drought_proofing_wb::economics::{self, InterventionCost};
use drought_proofing_wb::error::DrpfError;
use drought_proofing_wb::io::kv::{self, require_float, require_string};
use drought_proofing_wb::io::{output, series};
use drought_proofing_wb::pipeline::{self, CropConfig, ScenarioInputs, WatershedConfig};

#[derive(Parser)]
#[command(name = "drought_proofing_wb")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Runs one scenario end to end.
    Run {
        scenario_number: u32,
        #[arg(long, value_enum, default_value = "calendar")]
        cycle: CycleArg,
        #[arg(long, default_value = ".")]
        directory: PathBuf,
    },
}

#[derive(Clone, clap::ValueEnum)]
enum CycleArg {
    Crop,
    Calendar,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let Command::Run {
        scenario_number,
        cycle,
        directory,
    } = cli.command;

    let year_type = match cycle {
        CycleArg::Crop => YearType::Crop,
        CycleArg::Calendar => YearType::Calendar,
    };

    match run(&directory, scenario_number, year_type) {
        Ok(()) => {
            info!(scenario_number, "run complete");
            Ok(())
        }
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    }
}

fn run(directory: &Path, scenario_number: u32, year_type: YearType) -> anyhow::Result<()> {
    kv::clear_file_paths_cache();

    let datasets = directory.join("Datasets");
    let inputs_dir = datasets.join("Inputs");

    if scenario_number > 0 {
        let scenario_file = inputs_dir
            .join("csv_inputs")
            .join(format!("interventions_scenario_{scenario_number}.csv"));
        let target = inputs_dir.join("csv_inputs").join("interventions.csv");
        std::fs::copy(&scenario_file, &target)?;
    } else {
        let baseline = inputs_dir.join("csv_inputs").join("interventions_baseline.csv");
        let target = inputs_dir.join("csv_inputs").join("interventions.csv");
        std::fs::copy(&baseline, &target)?;
    }

    info!(scenario_number, "loading inputs");
    let watershed_kv = kv::read_kv_csv(&inputs_dir.join("csv_inputs").join("input.csv"))?;
    let interventions_kv = kv::read_kv_csv(&inputs_dir.join("csv_inputs").join("interventions.csv"))?;

    let precip = series::read_daily_precip(&inputs_dir.join("mandatory_inputs").join("pcp.csv"))?;
    let monthly_temps = series::read_monthly_temp(&inputs_dir.join("mandatory_inputs").join("temp.csv"))?;
    let irrigation_canal_m3 = series::read_irrigation(&inputs_dir.join("mandatory_inputs").join("irrigation.csv"))?;
    let crop_db_rows = series::read_crop_db(&inputs_dir.join("static_inputs").join("crop_db.csv"))?;
    let radiation = series::read_radiation_db(&inputs_dir.join("static_inputs").join("radiation_db.csv"))?;

    let watershed = build_watershed_config(&watershed_kv, &interventions_kv, year_type)?;
    let crop_cn_db = build_crop_cn_db(&crop_db_rows);
    let crops = build_crop_configs(&crop_db_rows, &interventions_kv)?;

    let series_first_year = precip.first().map(|(d, _)| chrono::Datelike::year(d)).unwrap_or(2000);

    let scenario_inputs = ScenarioInputs {
        watershed,
        crops,
        precip,
        monthly_temps,
        radiation,
        crop_cn_db,
        irrigation_canal_m3,
        series_first_year,
    };

    info!("running pipeline");
    let outputs = pipeline::run_scenario(&scenario_inputs)?;

    let out_dir = datasets.join("Outputs").join(if scenario_number == 0 {
        "Baseline_Scenario".to_string()
    } else {
        format!("Scenario_{scenario_number}")
    });

    let rounded_daily: Vec<_> = outputs
        .daily_rows
        .into_iter()
        .map(|mut r| {
            r.peff_mm = output::round_sig6(r.peff_mm);
            r.etc_mm = output::round_sig6(r.etc_mm);
            r.ae_crop_mm = output::round_sig6(r.ae_crop_mm);
            r.ae_soil_mm = output::round_sig6(r.ae_soil_mm);
            r.smd_mm = output::round_sig6(r.smd_mm);
            r.gwnr_mm = output::round_sig6(r.gwnr_mm);
            r.iwr_mm = output::round_sig6(r.iwr_mm);
            r.runoff_mm = output::round_sig6(r.runoff_mm);
            r.cn2 = output::round_sig6(r.cn2);
            r
        })
        .collect();

    output::write_csv(&out_dir.join("df_dd.csv"), &rounded_daily)?;
    output::write_csv(&out_dir.join("df_mm.csv"), &outputs.monthly_rows)?;
    output::write_csv(&out_dir.join("df_cwr_met_output.csv"), &outputs.cwr_rows)?;
    output::write_csv(&out_dir.join("df_yield_output.csv"), &outputs.yield_rows)?;
    output::write_csv(&out_dir.join("df_drought_output.csv"), &outputs.drought_rows)?;

    let int_rows = build_economics_rows(&interventions_kv, &watershed_kv);
    output::write_csv(&out_dir.join("df_int.csv"), &int_rows)?;

    Ok(())
}

#[derive(Serialize)]
struct InterventionEconomicsRow {
    intervention: String,
    number_of_units: u32,
    capital_cost: f64,
    eac: f64,
    maintenance_cost: f64,
    npv: f64,
}

/// Builds `df_int`: one row per named intervention line item present in
/// `interventions.csv` (`<Name>_Volume`, `<Name>_Cost_Per_Unit`,
/// `<Name>_Life_Span`, `<Name>_Maintenance_Pct`), against the watershed's
/// shared `Interest_Rate`/`Time_Period`. Grounded on `Original/Economic.py`
/// (DESIGN.md, SPEC_FULL.md §10).
fn build_economics_rows(
    interventions_kv: &HashMap<String, String>,
    watershed_kv: &HashMap<String, String>,
) -> Vec<InterventionEconomicsRow> {
    let interest_rate = require_float(watershed_kv, "Interest_Rate").unwrap_or(8.0);
    let time_period = require_float(watershed_kv, "Time_Period").unwrap_or(10.0);

    let mut names: Vec<String> = interventions_kv
        .keys()
        .filter_map(|k| k.strip_suffix("_Volume").map(str::to_string))
        .collect();
    names.sort();

    let mut rows = Vec::new();
    for name in names {
        let volume_or_area = interventions_kv
            .get(&format!("{name}_Volume"))
            .and_then(|v| v.parse().ok())
            .unwrap_or(0.0);
        let cost_per_unit = interventions_kv
            .get(&format!("{name}_Cost_Per_Unit"))
            .and_then(|v| v.parse().ok())
            .unwrap_or(0.0);
        let life_span_years = interventions_kv
            .get(&format!("{name}_Life_Span"))
            .and_then(|v| v.parse().ok())
            .unwrap_or(0.0);
        let maintenance_pct = interventions_kv
            .get(&format!("{name}_Maintenance_Pct"))
            .and_then(|v| v.parse().ok())
            .unwrap_or(0.0);

        if volume_or_area <= 0.0 {
            continue;
        }

        let cost = InterventionCost {
            volume_or_area,
            cost_per_unit,
            life_span_years,
            maintenance_pct,
        };
        let capital = economics::capital_cost(&cost);
        let number_of_units = economics::number_of_units(time_period, life_span_years);
        let eac = match economics::calculate_eac(capital, interest_rate, time_period) {
            Ok(v) => v,
            Err(e) => {
                error!("{name}: {e}");
                continue;
            }
        };
        let maintenance = economics::calculate_maintenance_cost(eac, maintenance_pct, time_period);
        let npv = economics::calc_npv(maintenance, eac, interest_rate, time_period);

        rows.push(InterventionEconomicsRow {
            intervention: name,
            number_of_units,
            capital_cost: output::round_sig6(capital),
            eac: output::round_sig6(eac),
            maintenance_cost: output::round_sig6(maintenance),
            npv: output::round_sig6(npv),
        });
    }
    rows
}

/// Reads one named supply-side structure's `<Name>_Volume`/`_Depth`/
/// `_Infiltration_Rate` triple from `interventions.csv` (spec.md §3,
/// "Supply-side"). Missing fields default to 0 (no structure built).
fn structure_field(kv: &HashMap<String, String>, name: &str, suffix: &str) -> f64 {
    kv.get(&format!("{name}_{suffix}"))
        .and_then(|v| v.parse().ok())
        .unwrap_or(0.0)
}

/// `S_cap`/`AR_cap` (spec.md §4.8): `S_cap` = farm-pond (unlined/lined) and
/// check-dam volumes less their own monthly infiltration recharge; `AR_cap`
/// = the infiltration-pond's monthly recharge plus the injection wells'
/// daily-rate·count·30 contribution.
fn build_storage_capacities(interventions_kv: &HashMap<String, String>) -> anyhow::Result<(f64, f64)> {
    let mut s_cap_structures = 0.0;
    let mut s_cap_recharge = 0.0;
    for name in ["Farm_Pond_Unlined", "Farm_Pond_Lined", "Check_Dam"] {
        let volume = structure_field(interventions_kv, name, "Volume");
        let depth = structure_field(interventions_kv, name, "Depth");
        let infiltration_rate = structure_field(interventions_kv, name, "Infiltration_Rate");
        s_cap_structures += volume;
        s_cap_recharge += storage::monthly_infiltration_recharge_m3(volume, depth, infiltration_rate)?;
    }
    let s_cap_m3 = (s_cap_structures - s_cap_recharge).max(0.0);

    let infiltration_pond_volume = structure_field(interventions_kv, "Infiltration_Pond", "Volume");
    let infiltration_pond_depth = structure_field(interventions_kv, "Infiltration_Pond", "Depth");
    let infiltration_pond_rate = structure_field(interventions_kv, "Infiltration_Pond", "Infiltration_Rate");
    let infiltration_pond_recharge = storage::monthly_infiltration_recharge_m3(
        infiltration_pond_volume,
        infiltration_pond_depth,
        infiltration_pond_rate,
    )?;

    let injection_wells_rate = structure_field(interventions_kv, "Injection_Wells", "Volume");
    let injection_wells_nos = structure_field(interventions_kv, "Injection_Wells", "Nos");
    let ar_cap_m3 = infiltration_pond_recharge + injection_wells_rate * injection_wells_nos * 30.0;

    Ok((s_cap_m3, ar_cap_m3))
}

fn build_watershed_config(
    kv: &HashMap<String, String>,
    interventions_kv: &HashMap<String, String>,
    year_type: YearType,
) -> anyhow::Result<WatershedConfig> {
    let texture = |key: &str| -> anyhow::Result<SoilTexture> {
        Ok(match require_string(kv, key)? {
            "Sand" => SoilTexture::Sand,
            "Sandy Loam" => SoilTexture::SandyLoam,
            "Loam" => SoilTexture::Loam,
            "Clayey Loam" => SoilTexture::ClayeyLoam,
            "Clay" => SoilTexture::Clay,
            other => anyhow::bail!("unknown soil texture '{other}'"),
        })
    };
    let hsc = |key: &str| -> anyhow::Result<HydrologicSoilClass> {
        Ok(match require_string(kv, key)? {
            "Poor" => HydrologicSoilClass::Poor,
            _ => HydrologicSoilClass::Good,
        })
    };
    let climate = match require_string(kv, "Climate")? {
        "Temperate" => Climate::Temperate,
        _ => Climate::SemiArid,
    };

    let total_area = require_float(kv, "Total_Area")?;
    let (s_cap_m3, ar_cap_m3) = build_storage_capacities(interventions_kv)?;

    Ok(WatershedConfig {
        latitude: require_float(kv, "Latitude")?,
        climate,
        slope_pct: 0.0,
        soil_profile: SoilProfile {
            layer1: SoilLayer {
                texture: texture("Texture_L1")?,
                hsc: hsc("HSC_L1")?,
                depth_m: require_float(kv, "Depth_L1")?,
                share_pct: require_float(kv, "Dist_L1")?,
            },
            layer2: SoilLayer {
                texture: texture("Texture_L2")?,
                hsc: hsc("HSC_L2")?,
                depth_m: require_float(kv, "Depth_L2")?,
                share_pct: require_float(kv, "Dist_L2")?,
            },
        },
        built_ha: require_float(kv, "Built_up")?,
        water_ha: require_float(kv, "Water_Bodies")?,
        pasture_ha: require_float(kv, "Pasture")?,
        forest_ha: require_float(kv, "Forest")?,
        fallow_area_ha: require_float(kv, "Fallow")?,
        fallow_cn_layer1: require_float(kv, "Fallow_CN_L1").unwrap_or(77.0),
        fallow_cn_layer2: require_float(kv, "Fallow_CN_L2").unwrap_or(77.0),
        dist1_pct: require_float(kv, "Dist_L1")?,
        dist2_pct: require_float(kv, "Dist_L2")?,
        total_area_ha: total_area,
        population: require_float(kv, "Population").unwrap_or(0.0),
        per_capita_lpcd: require_float(kv, "Per_Capita_Use").unwrap_or(0.0),
        other_use_m3_per_year: require_float(kv, "Other_Use").unwrap_or(0.0),
        gw_dep_domestic_pct: require_float(kv, "GW_Dependency_Domestic").unwrap_or(0.0),
        aquifer_depth_m: require_float(kv, "Aquifer_Depth")?,
        specific_yield_pct: require_float(kv, "Specific_Yield")?,
        starting_level_m: require_float(kv, "Starting_Level")?,
        s_cap_m3,
        ar_cap_m3,
        year_type,
    })
}

fn build_crop_cn_db(rows: &[series::CropDbRow]) -> CropCnDatabase {
    let mut db = CropCnDatabase::new();
    for row in rows {
        for (texture_col, texture) in [
            ("CN2_Sand", SoilTexture::Sand),
            ("CN2_Sandy_Loam", SoilTexture::SandyLoam),
            ("CN2_Loam", SoilTexture::Loam),
            ("CN2_Clayey_Loam", SoilTexture::ClayeyLoam),
            ("CN2_Clay", SoilTexture::Clay),
        ] {
            if let Some(v) = row.fields.get(texture_col).and_then(|v| v.parse::<f64>().ok()) {
                db.insert_full(&row.cover_type, &row.treatment_type, "Good", texture, v);
                db.insert_hardcoded_default(&row.cover_type, texture, v);
            }
        }
    }
    db
}

/// One `<Crop>_<Practice>_Area`/`_Red`/`_Evap_Red_Pct` soil-moisture
/// practice (Cover-Crops, Mulching, Bunds, Tillage, BBF, Tank-Desilting —
/// spec.md §3). Tank-Desilting has no reduction field of its own; it uses
/// the Tillage reduction, per `curve_number::crop_cn2_after_interventions`.
fn read_crop_area(interventions_kv: &HashMap<String, String>, crop_name: &str, practice: &str) -> f64 {
    interventions_kv
        .get(&format!("{crop_name}_{practice}_Area"))
        .and_then(|v| v.parse().ok())
        .unwrap_or(0.0)
}

fn read_crop_field(interventions_kv: &HashMap<String, String>, crop_name: &str, practice: &str, suffix: &str) -> f64 {
    interventions_kv
        .get(&format!("{crop_name}_{practice}_{suffix}"))
        .and_then(|v| v.parse().ok())
        .unwrap_or(0.0)
}

fn check_area_invariant(crop_name: &str, intervention: &str, area: f64, crop_area: f64) -> anyhow::Result<()> {
    if area > crop_area + 1e-6 {
        return Err(DrpfError::AreaInvariant {
            crop: crop_name.to_string(),
            intervention: intervention.to_string(),
            area,
            crop_area,
        }
        .into());
    }
    Ok(())
}

/// Per-crop CN intervention areas/reductions and soil-conservation practices
/// (spec.md §3's "Soil-moisture" group: Cover-Crops, Mulching, Bunds,
/// Tillage, BBF, Tank-Desilting). Each practice's area feeds both the CN
/// reduction (`CnInterventionAreas`/`CnInterventionReductions`) and the
/// soil-moisture/evaporation-reduction blend (`SoilConservationPractice`).
fn build_soil_moisture_interventions(
    interventions_kv: &HashMap<String, String>,
    crop_name: &str,
    crop_area_ha: f64,
) -> anyhow::Result<(CnInterventionAreas, CnInterventionReductions, Vec<SoilConservationPractice>)> {
    let cover_ha = read_crop_area(interventions_kv, crop_name, "Cover_Crops");
    let mulching_ha = read_crop_area(interventions_kv, crop_name, "Mulching");
    let bunds_ha = read_crop_area(interventions_kv, crop_name, "Bunds");
    let tillage_ha = read_crop_area(interventions_kv, crop_name, "Tillage");
    let bbf_ha = read_crop_area(interventions_kv, crop_name, "BBF");
    let tank_ha = read_crop_area(interventions_kv, crop_name, "Tank");

    for (practice, area) in [
        ("Cover_Crops", cover_ha),
        ("Mulching", mulching_ha),
        ("Bunds", bunds_ha),
        ("Tillage", tillage_ha),
        ("BBF", bbf_ha),
        ("Tank", tank_ha),
    ] {
        check_area_invariant(crop_name, practice, area, crop_area_ha)?;
    }

    let areas = CnInterventionAreas {
        cover_ha,
        mulching_ha,
        bunds_ha,
        tillage_ha,
        bbf_ha,
        tank_ha,
    };
    let reductions = CnInterventionReductions {
        cover_red: read_crop_field(interventions_kv, crop_name, "Cover_Crops", "Red"),
        mulching_red: read_crop_field(interventions_kv, crop_name, "Mulching", "Red"),
        bunds_red: read_crop_field(interventions_kv, crop_name, "Bunds", "Red"),
        tillage_red: read_crop_field(interventions_kv, crop_name, "Tillage", "Red"),
        bbf_red: read_crop_field(interventions_kv, crop_name, "BBF", "Red"),
    };

    let practices: Vec<SoilConservationPractice> = [
        (cover_ha, "Cover_Crops"),
        (mulching_ha, "Mulching"),
        (bunds_ha, "Bunds"),
        (tillage_ha, "Tillage"),
        (bbf_ha, "BBF"),
        (tank_ha, "Tank"),
    ]
    .into_iter()
    .filter(|(area, _)| *area > 0.0)
    .map(|(area_ha, practice)| {
        let evap_red_pct = read_crop_field(interventions_kv, crop_name, practice, "Evap_Red_Pct");
        SoilConservationPractice {
            area_ha,
            sm_factor_pct: (100.0 - evap_red_pct).clamp(0.0, 100.0),
        }
    })
    .collect();

    Ok((areas, reductions, practices))
}

/// Per-crop irrigation-efficiency bundle (spec.md §3's "Demand-side"
/// group: Drip, Sprinkler, Land-Levelling, DSR, AWD, SRI, Ridge-Furrow,
/// Deficit). BBF's area is shared with the soil-moisture group (it is a
/// high-efficiency-equipment member per spec.md §4.9 *and* a CN/evaporation
/// practice per §3); its efficiency is read separately here.
fn build_irrigation_interventions(
    interventions_kv: &HashMap<String, String>,
    crop_name: &str,
    crop_area_ha: f64,
) -> anyhow::Result<CropIntervention> {
    let read_pct = |practice: &str| read_crop_field(interventions_kv, crop_name, practice, "Eff") / 100.0;

    let intervention = CropIntervention {
        drip_area_ha: read_crop_area(interventions_kv, crop_name, "Drip"),
        drip_eff_frac: read_pct("Drip"),
        sprinkler_area_ha: read_crop_area(interventions_kv, crop_name, "Sprinkler"),
        sprinkler_eff_frac: read_pct("Sprinkler"),
        bbf_area_ha: read_crop_area(interventions_kv, crop_name, "BBF"),
        bbf_eff_frac: read_pct("BBF"),
        land_levelling_area_ha: read_crop_area(interventions_kv, crop_name, "Land_Levelling"),
        land_levelling_eff_frac: read_pct("Land_Levelling"),
        dsr_area_ha: read_crop_area(interventions_kv, crop_name, "DSR"),
        dsr_eff_frac: read_pct("DSR"),
        awd_area_ha: read_crop_area(interventions_kv, crop_name, "AWD"),
        awd_eff_frac: read_pct("AWD"),
        sri_area_ha: read_crop_area(interventions_kv, crop_name, "SRI"),
        sri_eff_frac: read_pct("SRI"),
        ridge_furrow_area_ha: read_crop_area(interventions_kv, crop_name, "Ridge_Furrow"),
        ridge_furrow_eff_frac: read_pct("Ridge_Furrow"),
        deficit_area_ha: read_crop_area(interventions_kv, crop_name, "Deficit"),
        deficit_eff_frac: read_pct("Deficit"),
    };

    for (practice, area) in [
        ("Drip", intervention.drip_area_ha),
        ("Sprinkler", intervention.sprinkler_area_ha),
        ("Land_Levelling", intervention.land_levelling_area_ha),
        ("DSR", intervention.dsr_area_ha),
        ("AWD", intervention.awd_area_ha),
        ("SRI", intervention.sri_area_ha),
        ("Ridge_Furrow", intervention.ridge_furrow_area_ha),
        ("Deficit", intervention.deficit_area_ha),
    ] {
        check_area_invariant(crop_name, practice, area, crop_area_ha)?;
    }

    Ok(intervention)
}

fn build_crop_configs(
    rows: &[series::CropDbRow],
    interventions_kv: &HashMap<String, String>,
) -> anyhow::Result<Vec<CropConfig>> {
    let db_crop_names: std::collections::HashSet<&str> = rows.iter().map(|r| r.crop_name.as_str()).collect();
    for key in interventions_kv.keys() {
        if let Some(crop_name) = key.strip_suffix("_Irr_Area").or_else(|| key.strip_suffix("_Rainfed_Area")) {
            if !db_crop_names.contains(crop_name) {
                return Err(DrpfError::CropNotInDb(crop_name.to_string()).into());
            }
        }
    }

    let mut crops = Vec::new();
    for row in rows {
        let irrigated_key = format!("{}_Irr_Area", row.crop_name);
        let rainfed_key = format!("{}_Rainfed_Area", row.crop_name);
        let irrigated_area_ha = interventions_kv
            .get(&irrigated_key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(0.0);
        let rainfed_area_ha = interventions_kv
            .get(&rainfed_key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(0.0);
        if irrigated_area_ha <= 0.0 && rainfed_area_ha <= 0.0 {
            continue;
        }
        let total_area_ha = irrigated_area_ha + rainfed_area_ha;

        let get_field_f64 = |key: &str, default: f64| -> f64 {
            row.fields.get(key).and_then(|v| v.parse().ok()).unwrap_or(default)
        };

        let phenology = CropPhenology {
            sowing_month: get_field_f64("Sowing_Month", 1.0) as u32,
            sowing_week: get_field_f64("Sowing_Week", 1.0) as u32,
            l_ini: round_stage_length(get_field_f64("L_ini", 0.0)),
            l_dev: round_stage_length(get_field_f64("L_dev", 0.0)),
            l_mid: round_stage_length(get_field_f64("L_mid", 0.0)),
            l_late: round_stage_length(get_field_f64("L_late", 0.0)),
            kc_ini: get_field_f64("Kc_ini", 0.0),
            kc_dev: get_field_f64("Kc_dev", 0.0),
            kc_mid: get_field_f64("Kc_mid", 0.0),
            kc_end: get_field_f64("Kc_end", 0.0),
            min_root_depth_m: get_field_f64("Min_Root_Depth", 0.3),
            max_root_depth_m: get_field_f64("Max_Root_Depth", 1.0),
            depletion_fraction: get_field_f64("Depletion_Fraction", 0.5),
        };

        let season = match row.fields.get("Season").map(String::as_str) {
            Some("Rabi") => Season::Rabi,
            Some("Summer") => Season::Summer,
            _ => Season::Kharif,
        };

        let (cn_interventions, cn_reductions, soil_con_practices) =
            build_soil_moisture_interventions(interventions_kv, &row.crop_name, total_area_ha)?;
        let irrigation_interventions = build_irrigation_interventions(interventions_kv, &row.crop_name, total_area_ha)?;
        let with_out_soil_con_pct = interventions_kv
            .get(&format!("{}_With_Out_Soil_Con_Pct", row.crop_name))
            .and_then(|v| v.parse().ok())
            .unwrap_or(100.0);

        crops.push(CropConfig {
            name: row.crop_name.clone(),
            phenology,
            ky: row.ky,
            max_yield_t_per_ha: row.max_yield_t_per_ha,
            price_per_t: row.price_per_t,
            cover_type: row.cover_type.clone(),
            treatment_type: row.treatment_type.clone(),
            irrigated_area_ha,
            rainfed_area_ha,
            season,
            cn_interventions,
            cn_reductions,
            soil_con_practices,
            with_out_soil_con_pct,
            irrigation_interventions,
            gw_dep_pct: interventions_kv
                .get(&format!("{}_GW_Dep", row.crop_name))
                .and_then(|v| v.parse().ok())
                .unwrap_or(50.0),
            sw_dep_pct: interventions_kv
                .get(&format!("{}_SW_Dep", row.crop_name))
                .and_then(|v| v.parse().ok())
                .unwrap_or(50.0),
        });
    }
    Ok(crops)
}
