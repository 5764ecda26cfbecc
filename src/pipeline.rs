//! Orchestrates C1 → C3 → C2 → C4 → C5 → C6 → C7 → C9 → C8 → C10 in the
//! dependency order of spec.md §2 (the `dr_prf_all_processes` equivalent).
//! No numerical logic lives here — every formula is in `core::`; this module
//! only threads typed records between components and aggregates into the
//! output artefacts of spec.md §6.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::info;

use crate::config::Climate;
use crate::core::aggregate::{self, Season, YearType};
use crate::core::climate::{self, MonthlyTemp, RadiationTable};
use crate::core::curve_number::{self, CropCnDatabase, CnInterventionAreas, CnInterventionReductions, LulcAreas};
use crate::core::efficiency::{self, CropIntervention};
use crate::core::fallow::{self, FallowDayInputs};
use crate::core::phenology::{self, CropPhenology};
use crate::core::runoff;
use crate::core::smd::{self, PlotDayInputs};
use crate::core::soil::{self, SoilConservationPractice, SoilProfile};
use crate::core::storage::{self, MonthlyDrivers, StorageCapacities};
use crate::error::{safe_divide, DrpfResult};

/// Per-crop static configuration resolved from `crop_db.csv` and the
/// intervention key/value files. One plot per crop (spec.md §4.2's
/// pass-through case for `aggregate_plot`).
#[derive(Debug, Clone)]
pub struct CropConfig {
    pub name: String,
    pub phenology: CropPhenology,
    pub ky: f64,
    pub max_yield_t_per_ha: f64,
    pub price_per_t: f64,
    pub cover_type: String,
    pub treatment_type: String,
    pub irrigated_area_ha: f64,
    pub rainfed_area_ha: f64,
    pub season: Season,
    pub cn_interventions: CnInterventionAreas,
    pub cn_reductions: CnInterventionReductions,
    pub soil_con_practices: Vec<SoilConservationPractice>,
    pub with_out_soil_con_pct: f64,
    pub irrigation_interventions: CropIntervention,
    pub gw_dep_pct: f64,
    pub sw_dep_pct: f64,
}

impl CropConfig {
    pub fn total_area_ha(&self) -> f64 {
        self.irrigated_area_ha + self.rainfed_area_ha
    }
}

/// Watershed-wide configuration: land use, soil, aquifer, population, and the
/// two non-crop land-use buckets that feed the fallow bucket.
#[derive(Debug, Clone)]
pub struct WatershedConfig {
    pub latitude: f64,
    pub climate: Climate,
    pub slope_pct: f64,
    pub soil_profile: SoilProfile,
    pub built_ha: f64,
    pub water_ha: f64,
    pub pasture_ha: f64,
    pub forest_ha: f64,
    pub fallow_area_ha: f64,
    pub fallow_cn_layer1: f64,
    pub fallow_cn_layer2: f64,
    pub dist1_pct: f64,
    pub dist2_pct: f64,
    pub total_area_ha: f64,
    pub population: f64,
    pub per_capita_lpcd: f64,
    pub other_use_m3_per_year: f64,
    pub gw_dep_domestic_pct: f64,
    pub aquifer_depth_m: f64,
    pub specific_yield_pct: f64,
    pub starting_level_m: f64,
    pub s_cap_m3: f64,
    pub ar_cap_m3: f64,
    pub year_type: YearType,
}

/// One simulation's full input bundle.
pub struct ScenarioInputs {
    pub watershed: WatershedConfig,
    pub crops: Vec<CropConfig>,
    pub precip: Vec<(NaiveDate, f64)>,
    pub monthly_temps: Vec<MonthlyTemp>,
    pub radiation: RadiationTable,
    pub crop_cn_db: CropCnDatabase,
    pub irrigation_canal_m3: [f64; 12],
    pub series_first_year: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyRow {
    pub date: String,
    pub crop: String,
    pub peff_mm: f64,
    pub etc_mm: f64,
    pub ae_crop_mm: f64,
    pub ae_soil_mm: f64,
    pub smd_mm: f64,
    pub gwnr_mm: f64,
    pub iwr_mm: f64,
    pub runoff_mm: f64,
    pub cn2: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyRow {
    pub year: i32,
    pub month: u32,
    pub storage_m3: f64,
    pub act_recharge_m3: f64,
    pub act_et_m3: f64,
    pub act_iwr_m3: f64,
    pub gw_extracted_m3: f64,
    pub rejected_recharge_m3: f64,
    pub final_runoff_mm: f64,
    pub final_recharge_mm: f64,
    pub final_et_mm: f64,
}

/// Calendar and water-year rollups both land in the same CSV, distinguished
/// by `year_type` (spec.md §4.10/§9: both groupings are surfaced side by
/// side, not just one).
#[derive(Debug, Clone, Serialize)]
pub struct CwrRow {
    pub crop: String,
    pub year: i32,
    pub year_type: String,
    pub irr_pct_cwr_met: f64,
    pub rainfed_pct_cwr_met: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct YieldRow {
    pub crop: String,
    pub year: i32,
    pub year_type: String,
    pub irr_yield: f64,
    pub rainfed_yield: f64,
    pub avg_yield: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DroughtRow {
    pub year: i32,
    pub year_type: String,
    pub drought_proofing_index: f64,
    pub et_biological_mm: f64,
}

/// Per-crop per-day intermediate state carried from C6 into C9/C8/C10. CN2,
/// Peff and runoff are watershed-level (spec.md §4.4's single daily final
/// CN2), not per-crop, so they live in their own day-indexed vectors instead
/// of here.
struct CropDailyState {
    smd: Vec<smd::PlotDayOutput>,
    etc_series: Vec<f64>,
    iwr_series: Vec<f64>,
}

/// Runs the full pipeline over `inputs`, returning every output artefact of
/// spec.md §6 except the economics table (computed separately, see
/// `economics.rs`, since it does not depend on the daily/monthly recursion).
pub fn run_scenario(inputs: &ScenarioInputs) -> DrpfResult<ScenarioOutputs> {
    info!("C1: building daily climate series");
    let daily_climate = climate::build_daily_climate(
        &inputs.precip,
        &inputs.monthly_temps,
        &inputs.radiation,
        inputs.watershed.latitude,
    )?;
    let n_days = daily_climate.len();

    info!("C3: computing soil capacities");
    let awc_capacity = soil::calc_awc_capacity(&inputs.watershed.soil_profile);
    let surface_evap = soil::calc_surface_evap_depths();

    let total_crop_area_ha: f64 = inputs.crops.iter().map(|c| c.total_area_ha()).sum();

    info!("C4: per-crop static CN2 after interventions");
    let crop_cn2_after_int: HashMap<String, f64> = inputs
        .crops
        .iter()
        .map(|crop| {
            let actual_cn2 = curve_number::actual_cn2(
                inputs.crop_cn_db.lookup(
                    &crop.cover_type,
                    &crop.treatment_type,
                    inputs.watershed.soil_profile.layer1.hsc.as_str(),
                    inputs.watershed.soil_profile.layer1.texture,
                ),
                inputs.watershed.dist1_pct,
                inputs.crop_cn_db.lookup(
                    &crop.cover_type,
                    &crop.treatment_type,
                    inputs.watershed.soil_profile.layer2.hsc.as_str(),
                    inputs.watershed.soil_profile.layer2.texture,
                ),
                inputs.watershed.dist2_pct,
            );
            let after_interventions = curve_number::crop_cn2_after_interventions(
                actual_cn2,
                crop.cn_interventions,
                crop.cn_reductions,
                crop.total_area_ha(),
            );
            (crop.name.clone(), after_interventions)
        })
        .collect();

    let fallow_cn2_value = if inputs.watershed.fallow_area_ha > 0.0 {
        curve_number::fallow_cn2(
            inputs.watershed.fallow_cn_layer1,
            inputs.watershed.dist1_pct,
            inputs.watershed.fallow_cn_layer2,
            inputs.watershed.dist2_pct,
        )
    } else {
        0.0
    };

    let non_dormant_by_crop_day: HashMap<String, Vec<bool>> = inputs
        .crops
        .iter()
        .map(|crop| {
            let series: Vec<bool> = daily_climate
                .iter()
                .map(|d| phenology::remaining_growth_days(&crop.phenology, d.date, inputs.series_first_year) > 0)
                .collect();
            (crop.name.clone(), series)
        })
        .collect();

    info!("C4-C5: watershed-level daily CN2 consolidation and runoff");
    let lulc = LulcAreas {
        built_ha: inputs.watershed.built_ha,
        water_ha: inputs.watershed.water_ha,
        pasture_ha: inputs.watershed.pasture_ha,
        forest_ha: inputs.watershed.forest_ha,
        crop_area_ha: total_crop_area_ha,
        fallow_area_ha: inputs.watershed.fallow_area_ha,
    };

    let mut day_final_cn2 = Vec::with_capacity(n_days);
    let mut day_peff_mm = Vec::with_capacity(n_days);
    let mut day_runoff_mm = Vec::with_capacity(n_days);

    for (i, day) in daily_climate.iter().enumerate() {
        let any_non_dormant = inputs.crops.iter().any(|c| non_dormant_by_crop_day[&c.name][i]);

        let sown_area_and_cn2: Vec<(f64, f64)> = inputs
            .crops
            .iter()
            .filter(|c| non_dormant_by_crop_day[&c.name][i])
            .map(|c| (c.total_area_ha(), crop_cn2_after_int[&c.name]))
            .collect();
        let consolidated_crop_cn2 = curve_number::consolidated_crop_cn2(&sown_area_and_cn2);

        let final_cn2 =
            curve_number::final_cn2(lulc, consolidated_crop_cn2, fallow_cn2_value, inputs.watershed.total_area_ha);
        let cn2_adj = curve_number::cn2_adjusted(final_cn2, inputs.watershed.slope_pct);
        let cn1 = curve_number::cn1_from_cn2(cn2_adj);
        let cn3 = curve_number::cn3_from_cn2(cn2_adj);
        let amc = curve_number::classify_amc(day.rain5_mm, any_non_dormant);
        let cn = curve_number::select_cn(amc, cn1, cn2_adj, cn3);

        let ro = runoff::calc_daily_runoff(day.pi_mm, cn);
        day_final_cn2.push(cn2_adj);
        day_peff_mm.push(ro.peff_mm);
        day_runoff_mm.push(ro.runoff_mm);
    }

    let mut crop_states: HashMap<String, CropDailyState> = HashMap::new();
    let mut fallow_gwnr_series = vec![0.0_f64; n_days];
    let mut fallow_ae_soil_series = vec![0.0_f64; n_days];

    for crop in &inputs.crops {
        info!(crop = %crop.name, "C2-C6-C9: per-crop phenology, SMD, efficiency");
        let capacity = soil::calc_capacity(
            awc_capacity,
            crop.with_out_soil_con_pct,
            &crop.soil_con_practices,
            total_crop_area_ha,
        );
        let root_zone_at = |date: NaiveDate| {
            let rd = phenology::root_depth_m(&crop.phenology, date, inputs.series_first_year);
            let p = phenology::depletion_fraction(&crop.phenology, date, inputs.series_first_year);
            soil::calc_root_zone_depths(capacity, rd, p)
        };

        let final_evap_red = crop
            .soil_con_practices
            .iter()
            .map(|p| p.sm_factor_pct / 100.0)
            .fold(None, |acc, v| Some(acc.map_or(v, |a: f64| a.min(v))))
            .unwrap_or(1.0);

        let mut plot_inputs = Vec::with_capacity(n_days);
        let mut etc_series = Vec::with_capacity(n_days);

        for (i, day) in daily_climate.iter().enumerate() {
            let kc_stages = phenology::kc_stages(&crop.phenology, day.date, inputs.series_first_year);
            let kc = kc_stages.total();
            let kei = inputs.watershed.climate.kei();
            let ke = if kc > 0.0 { (kei - kc).max(0.0) } else { kei };

            let etc = day.etoi_mm * kc;
            let es = day.etoi_mm * ke;
            etc_series.push(etc);

            let root_zone = root_zone_at(day.date);

            plot_inputs.push(PlotDayInputs {
                kc,
                ke,
                etc_mm: etc,
                es_mm: es,
                peff_mm: day_peff_mm[i],
                taw_mm: root_zone.taw_mm,
                raw_mm: root_zone.raw_mm,
                tew_mm: surface_evap.tew_mm,
                rew_mm: surface_evap.rew_mm,
                final_evap_red,
            });
        }

        let smd_series = smd::run_plot_smd_recursion(&plot_inputs);
        let iwr_series: Vec<f64> = smd_series
            .iter()
            .zip(etc_series.iter())
            .map(|(s, etc)| smd::iwr(*etc, s.ae_crop_mm))
            .collect();

        crop_states.insert(
            crop.name.clone(),
            CropDailyState {
                smd: smd_series,
                etc_series,
                iwr_series,
            },
        );
    }

    info!("C7: fallow SMD recursion");
    let fallow_surface_evap = {
        let per_plot: Vec<_> = (0..inputs.crops.len()).map(|_| surface_evap).collect();
        soil::fallow_surface_evap_depths(&per_plot)
    };
    let fallow_inputs: Vec<FallowDayInputs> = daily_climate
        .iter()
        .enumerate()
        .map(|(i, d)| FallowDayInputs {
            etoi_mm: d.etoi_mm,
            peff_mm: day_peff_mm[i],
            tew_mm: fallow_surface_evap.tew_mm,
            rew_mm: fallow_surface_evap.rew_mm,
        })
        .collect();
    let fallow_smd = fallow::run_fallow_smd_recursion(&fallow_inputs);
    for (i, s) in fallow_smd.iter().enumerate() {
        fallow_gwnr_series[i] = s.gwnr_mm;
        fallow_ae_soil_series[i] = s.ae_soil_mm;
    }

    info!("C9: irrigation efficiency per crop");
    let mut daily_rows = Vec::with_capacity(n_days * inputs.crops.len().max(1));
    let mut irr_water_need_by_day: Vec<f64> = vec![0.0; n_days];
    let mut irr_water_need_by_crop: HashMap<String, Vec<f64>> = HashMap::new();

    for crop in &inputs.crops {
        let state = &crop_states[&crop.name];
        let base_eff = efficiency::base_efficiency(
            crop.irrigated_area_ha * crop.gw_dep_pct / 100.0,
            crate::config::DEFAULT_IRRIGATION_EFFICIENCY_PCT / 100.0,
            crop.irrigated_area_ha * crop.sw_dep_pct / 100.0,
            crate::config::DEFAULT_IRRIGATION_EFFICIENCY_PCT / 100.0,
            crop.irrigated_area_ha,
        );
        let return_flow = efficiency::combined_return_flow(crop.gw_dep_pct, crop.sw_dep_pct, &crop.name);
        let eff_result = efficiency::crop_efficiency(
            &crop.irrigation_interventions,
            base_eff,
            crop.irrigated_area_ha,
            return_flow,
        )
        .unwrap_or(efficiency::CropEfficiencyResult {
            overall_eff: base_eff,
            overall_water_saved_eff: base_eff,
            final_eff: base_eff,
        });

        let mut need_by_day = vec![0.0_f64; n_days];
        for i in 0..n_days {
            let iwr_mm = state.iwr_series[i];
            let need = efficiency::irrigation_water_need_m3(iwr_mm, crop.irrigated_area_ha, eff_result.final_eff);
            irr_water_need_by_day[i] += need;
            need_by_day[i] = need;

            daily_rows.push(DailyRow {
                date: daily_climate[i].date.to_string(),
                crop: crop.name.clone(),
                peff_mm: day_peff_mm[i],
                etc_mm: state.etc_series[i],
                ae_crop_mm: state.smd[i].ae_crop_mm,
                ae_soil_mm: state.smd[i].ae_soil_mm,
                smd_mm: state.smd[i].smd_mm,
                gwnr_mm: state.smd[i].gwnr_mm,
                iwr_mm,
                runoff_mm: day_runoff_mm[i],
                cn2: day_final_cn2[i],
            });
        }
        irr_water_need_by_crop.insert(crop.name.clone(), need_by_day);
    }

    info!("C8: monthly storage router");
    // Walks calendar months from the series' first day to its last via the
    // same `add_months` the phenology builder uses for sowing anchors.
    let mut months_index: Vec<(i32, u32)> = Vec::new();
    if let (Some(first), Some(last)) = (daily_climate.first(), daily_climate.last()) {
        let mut cursor = NaiveDate::from_ymd_opt(first.date.year(), first.date.month(), 1).unwrap();
        let last_month_start = NaiveDate::from_ymd_opt(last.date.year(), last.date.month(), 1).unwrap();
        while cursor <= last_month_start {
            months_index.push((cursor.year(), cursor.month()));
            cursor = crate::utils::add_months(cursor, 1).expect("month-start dates never hit Feb 30");
        }
    }

    let mut monthly_drivers = Vec::with_capacity(months_index.len());
    let mut months_day_idxs: Vec<Vec<usize>> = Vec::with_capacity(months_index.len());
    for (year, month) in months_index.iter() {
        let day_idxs: Vec<usize> = daily_climate
            .iter()
            .enumerate()
            .filter(|(_, d)| d.date.year() == *year && d.date.month() == *month)
            .map(|(i, _)| i)
            .collect();

        let rain_mm: f64 = day_idxs.iter().map(|&i| daily_climate[i].pi_mm).sum();
        let qom_mm: f64 = day_idxs.iter().map(|&i| day_runoff_mm[i]).sum();

        let natural_recharge_mm: f64 = day_idxs
            .iter()
            .map(|&i| {
                let plot_gwnr: Vec<(f64, f64)> = inputs
                    .crops
                    .iter()
                    .map(|c| (crop_states[&c.name].smd[i].gwnr_mm, c.total_area_ha()))
                    .collect();
                fallow::area_weighted_recharge(
                    &plot_gwnr,
                    fallow_gwnr_series[i],
                    inputs.watershed.fallow_area_ha,
                    total_crop_area_ha,
                )
            })
            .sum();

        let domestic_need_m3 = inputs.watershed.population * inputs.watershed.per_capita_lpcd * 365.0 / 12.0 / 1000.0;
        let other_need_m3 = inputs.watershed.other_use_m3_per_year / 12.0;
        let iwr_after_canal_m3 = (day_idxs.iter().map(|&i| irr_water_need_by_day[i]).sum::<f64>()
            - inputs.irrigation_canal_m3[(*month - 1) as usize])
            .max(0.0);

        monthly_drivers.push(MonthlyDrivers {
            qom_mm,
            rain_mm,
            total_area_ha: inputs.watershed.total_area_ha,
            domestic_need_m3,
            other_need_m3,
            gw_dep_pct: inputs.watershed.gw_dep_domestic_pct,
            potential_recharge_m3: natural_recharge_mm * inputs.watershed.total_area_ha * 10.0,
            potential_et_m3: day_idxs
                .iter()
                .map(|&i| inputs.crops.iter().map(|c| crop_states[&c.name].smd[i].ae_soil_mm).sum::<f64>())
                .sum::<f64>()
                * inputs.watershed.total_area_ha
                * 10.0
                / total_crop_area_ha.max(1.0),
            iwr_after_canal_m3,
            natural_recharge_mm,
            irr_water_need_m3: day_idxs.iter().map(|&i| irr_water_need_by_day[i]).sum(),
        });
        months_day_idxs.push(day_idxs);
    }

    let caps = StorageCapacities {
        s_cap_m3: inputs.watershed.s_cap_m3,
        ar_cap_m3: inputs.watershed.ar_cap_m3,
        aquifer_limit_m3: storage::aquifer_limit_m3(
            inputs.watershed.aquifer_depth_m,
            inputs.watershed.specific_yield_pct,
            inputs.watershed.total_area_ha,
        ),
    };
    let initial_residual = storage::initial_residual_storage_m3(
        inputs.watershed.specific_yield_pct,
        inputs.watershed.starting_level_m,
        inputs.watershed.total_area_ha,
    );
    let monthly_outputs = storage::run_monthly_storage_recursion(&monthly_drivers, &caps, initial_residual);

    let monthly_rows: Vec<MonthlyRow> = months_index
        .iter()
        .zip(monthly_outputs.iter())
        .map(|((year, month), out)| MonthlyRow {
            year: *year,
            month: *month,
            storage_m3: out.state.storage_m3,
            act_recharge_m3: out.state.act_recharge_m3,
            act_et_m3: out.state.act_et_m3,
            act_iwr_m3: out.state.act_iwr_m3,
            gw_extracted_m3: out.gw_extracted_m3,
            rejected_recharge_m3: out.state.rejected_recharge_m3,
            final_runoff_mm: out.final_runoff_mm,
            final_recharge_mm: out.final_recharge_mm,
            final_et_mm: out.final_et_mm,
        })
        .collect();

    info!("C8: per-crop monthly Pct_IWR_met allocation");
    // The storage router above works on the watershed's pooled monthly
    // irrigation need. Recovering a per-crop Pct_IWR_met means splitting the
    // pooled canal supply, post-storage Act_IWR, and GW_extracted back down
    // by each crop's share of that month's need (see DESIGN.md).
    let mut month_pct_iwr_met: HashMap<String, Vec<f64>> = inputs
        .crops
        .iter()
        .map(|c| (c.name.clone(), vec![0.0_f64; months_index.len()]))
        .collect();

    for (m_idx, (_, month)) in months_index.iter().enumerate() {
        let day_idxs = &months_day_idxs[m_idx];
        let canal_m3 = inputs.irrigation_canal_m3[(*month - 1) as usize];
        let out = &monthly_outputs[m_idx];
        let drivers = &monthly_drivers[m_idx];
        let scale = safe_divide(out.state.act_iwr_m3, drivers.iwr_after_canal_m3);

        let need_by_crop: HashMap<&str, f64> = inputs
            .crops
            .iter()
            .map(|c| {
                let need: f64 = day_idxs.iter().map(|&i| irr_water_need_by_crop[&c.name][i]).sum();
                (c.name.as_str(), need)
            })
            .collect();
        let total_need: f64 = need_by_crop.values().sum();

        // (need, post-canal need, Act_IWR) per crop.
        let alloc_by_crop: HashMap<&str, (f64, f64, f64)> = need_by_crop
            .iter()
            .map(|(&name, &need)| {
                let share = safe_divide(need, total_need);
                let after_canal = (need - canal_m3 * share).max(0.0);
                (name, (need, after_canal, after_canal * scale))
            })
            .collect();
        let total_unmet: f64 = alloc_by_crop
            .values()
            .map(|&(_, after_canal, act_iwr)| (after_canal - act_iwr).max(0.0))
            .sum();

        for crop in &inputs.crops {
            let &(need, after_canal, act_iwr) = &alloc_by_crop[crop.name.as_str()];
            let unmet = (after_canal - act_iwr).max(0.0);
            let gw_share = safe_divide(unmet, total_unmet);
            let gw_extracted = out.gw_extracted_m3 * gw_share;
            let pct = storage::pct_iwr_met(crop.irrigated_area_ha, need, act_iwr, gw_extracted);
            month_pct_iwr_met.get_mut(&crop.name).unwrap()[m_idx] = pct;
        }
    }

    let mut day_month_idx = vec![0usize; n_days];
    for (m_idx, idxs) in months_day_idxs.iter().enumerate() {
        for &i in idxs {
            day_month_idx[i] = m_idx;
        }
    }
    let day_pct_iwr_met: HashMap<String, Vec<f64>> = inputs
        .crops
        .iter()
        .map(|c| {
            let series: Vec<f64> = (0..n_days).map(|i| month_pct_iwr_met[&c.name][day_month_idx[i]]).collect();
            (c.name.clone(), series)
        })
        .collect();

    info!("C10: calendar-year and water-year aggregation, yield, drought index");
    let calendar_groups = year_groups_by(&daily_climate, |d| d.date.year());

    let water_year_start = {
        let sowing_by_season: Vec<(Season, u32)> =
            inputs.crops.iter().map(|c| (c.season, c.phenology.sowing_month)).collect();
        aggregate::water_year_start_month(&sowing_by_season).unwrap_or(1)
    };
    let water_year_groups = year_groups_by(&daily_climate, |d| {
        if d.date.month() >= water_year_start {
            d.date.year()
        } else {
            d.date.year() - 1
        }
    });

    let (mut cwr_rows, mut yield_rows, mut drought_rows) = rollup_year_groups(
        &calendar_groups,
        YearType::Calendar,
        &inputs.crops,
        &crop_states,
        &day_pct_iwr_met,
        &fallow_ae_soil_series,
        inputs.watershed.fallow_area_ha,
    );
    let (wy_cwr_rows, wy_yield_rows, wy_drought_rows) = rollup_year_groups(
        &water_year_groups,
        YearType::Crop,
        &inputs.crops,
        &crop_states,
        &day_pct_iwr_met,
        &fallow_ae_soil_series,
        inputs.watershed.fallow_area_ha,
    );
    cwr_rows.extend(wy_cwr_rows);
    yield_rows.extend(wy_yield_rows);
    drought_rows.extend(wy_drought_rows);

    Ok(ScenarioOutputs {
        daily_rows,
        monthly_rows,
        cwr_rows,
        yield_rows,
        drought_rows,
    })
}

/// Groups day indices by a caller-supplied year label (calendar year or
/// water year), in ascending label order.
fn year_groups_by(
    daily_climate: &[climate::DailyClimate],
    label_of: impl Fn(&climate::DailyClimate) -> i32,
) -> Vec<(i32, Vec<usize>)> {
    let mut labels: Vec<i32> = daily_climate.iter().map(|d| label_of(d)).collect();
    labels.sort_unstable();
    labels.dedup();
    labels
        .into_iter()
        .map(|label| {
            let idxs: Vec<usize> = daily_climate
                .iter()
                .enumerate()
                .filter(|(_, d)| label_of(d) == label)
                .map(|(i, _)| i)
                .collect();
            (label, idxs)
        })
        .collect()
}

/// One calendar-year or water-year rollup: per-crop CWR-met (irrigated vs.
/// rainfed, spec.md §4.10), FAO-33 yield, and the watershed's
/// drought-proofing index and ET_Biological for that year.
#[allow(clippy::too_many_arguments)]
fn rollup_year_groups(
    groups: &[(i32, Vec<usize>)],
    year_type: YearType,
    crops: &[CropConfig],
    crop_states: &HashMap<String, CropDailyState>,
    day_pct_iwr_met: &HashMap<String, Vec<f64>>,
    fallow_ae_soil_series: &[f64],
    fallow_area_ha: f64,
) -> (Vec<CwrRow>, Vec<YieldRow>, Vec<DroughtRow>) {
    let label = match year_type {
        YearType::Calendar => "Calendar",
        YearType::Crop => "WaterYear",
    };

    let mut cwr_rows = Vec::new();
    let mut yield_rows = Vec::new();
    let mut drought_rows = Vec::new();

    for (year, day_idxs) in groups {
        let mut per_crop_for_dpi = Vec::with_capacity(crops.len());
        let mut ae_by_crop = Vec::with_capacity(crops.len());

        for crop in crops {
            let state = &crop_states[&crop.name];
            let pct_iwr = &day_pct_iwr_met[&crop.name];

            let mut total_etc = 0.0;
            let mut total_irr_met = 0.0;
            let mut total_rainfed_met = 0.0;
            let mut total_ae_crop = 0.0;
            let mut total_ae_soil = 0.0;
            for &i in day_idxs {
                let etc = state.etc_series[i];
                let ae_crop = state.smd[i].ae_crop_mm;
                let iwr = state.iwr_series[i];
                total_etc += etc;
                total_ae_crop += ae_crop;
                total_ae_soil += state.smd[i].ae_soil_mm;
                // Irr_CWR_met = (ETci - IWR) + IWR * Pct_IWR_met = AE_crop + IWR met by irrigation.
                total_irr_met += ae_crop + iwr * pct_iwr[i];
                // Rainfed_CWR_met = ETci - IWR = AE_crop (no irrigation ever reaches these plots).
                total_rainfed_met += ae_crop;
            }

            let irr_pct = aggregate::pct_cwr_met(total_irr_met, total_etc, crop.irrigated_area_ha);
            let rainfed_pct = aggregate::pct_cwr_met(total_rainfed_met, total_etc, crop.rainfed_area_ha);
            cwr_rows.push(CwrRow {
                crop: crop.name.clone(),
                year: *year,
                year_type: label.to_string(),
                irr_pct_cwr_met: irr_pct,
                rainfed_pct_cwr_met: rainfed_pct,
            });

            let irr_yield = aggregate::calc_yield(crop.ky, irr_pct, year_type);
            let rainfed_yield = aggregate::calc_yield(crop.ky, rainfed_pct, year_type);
            let avg = aggregate::avg_yield(
                irr_yield,
                crop.irrigated_area_ha,
                rainfed_yield,
                crop.rainfed_area_ha,
                crop.total_area_ha(),
            );
            yield_rows.push(YieldRow {
                crop: crop.name.clone(),
                year: *year,
                year_type: label.to_string(),
                irr_yield,
                rainfed_yield,
                avg_yield: avg,
            });

            per_crop_for_dpi.push((irr_yield, crop.irrigated_area_ha, rainfed_yield, crop.rainfed_area_ha));
            ae_by_crop.push((crop.total_area_ha(), total_ae_crop, total_ae_soil));
        }

        let dpi = aggregate::drought_proofing_index(&per_crop_for_dpi);
        let ae_soil_fallow: f64 = day_idxs.iter().map(|&i| fallow_ae_soil_series[i]).sum();
        let et_bio = aggregate::et_biological(&ae_by_crop, fallow_area_ha, ae_soil_fallow);

        drought_rows.push(DroughtRow {
            year: *year,
            year_type: label.to_string(),
            drought_proofing_index: dpi,
            et_biological_mm: et_bio,
        });
    }

    (cwr_rows, yield_rows, drought_rows)
}

pub struct ScenarioOutputs {
    pub daily_rows: Vec<DailyRow>,
    pub monthly_rows: Vec<MonthlyRow>,
    pub cwr_rows: Vec<CwrRow>,
    pub yield_rows: Vec<YieldRow>,
    pub drought_rows: Vec<DroughtRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crop_config_total_area_is_sum() {
        let crop = CropConfig {
            name: "Test".to_string(),
            phenology: CropPhenology {
                sowing_month: 6,
                sowing_week: 1,
                l_ini: 20,
                l_dev: 30,
                l_mid: 40,
                l_late: 30,
                kc_ini: 0.5,
                kc_dev: 0.8,
                kc_mid: 1.1,
                kc_end: 0.7,
                min_root_depth_m: 0.3,
                max_root_depth_m: 1.0,
                depletion_fraction: 0.5,
            },
            ky: 0.9,
            max_yield_t_per_ha: 2.0,
            price_per_t: 1000.0,
            cover_type: "Row Crop".to_string(),
            treatment_type: "None".to_string(),
            irrigated_area_ha: 60.0,
            rainfed_area_ha: 40.0,
            season: Season::Kharif,
            cn_interventions: CnInterventionAreas::default(),
            cn_reductions: CnInterventionReductions::default(),
            soil_con_practices: vec![],
            with_out_soil_con_pct: 100.0,
            irrigation_interventions: CropIntervention::default(),
            gw_dep_pct: 50.0,
            sw_dep_pct: 50.0,
        };
        assert_eq!(crop.total_area_ha(), 100.0);
    }
}
