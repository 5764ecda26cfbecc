//! C8: monthly storage router (spec.md §4.8). The core stateful monthly
//! recursion; deliberately not vectorised (spec.md §9) — each step reads
//! only the previous month's outputs plus this month's own precomputed
//! potentials.

use crate::error::{safe_divide, DrpfError, DrpfResult};

/// Fixed month-independent capacities computed once per scenario.
#[derive(Debug, Clone, Copy)]
pub struct StorageCapacities {
    /// `S_cap`: farm-pond/check-dam volume less their monthly infiltration recharge.
    pub s_cap_m3: f64,
    /// `AR_cap`: infiltration-pond + injection-well monthly recharge capacity.
    pub ar_cap_m3: f64,
    /// `L`: aquifer storage limit.
    pub aquifer_limit_m3: f64,
}

/// `L = aquifer_depth * (specific_yield/100) * total_area * 10000` (m³).
pub fn aquifer_limit_m3(aquifer_depth_m: f64, specific_yield_pct: f64, total_area_ha: f64) -> f64 {
    aquifer_depth_m * (specific_yield_pct / 100.0) * total_area_ha * 10000.0
}

/// `ResidualStorage_0 = specific_yield% * starting_level_m * total_area * 10000`.
pub fn initial_residual_storage_m3(specific_yield_pct: f64, starting_level_m: f64, total_area_ha: f64) -> f64 {
    (specific_yield_pct / 100.0) * starting_level_m * total_area_ha * 10000.0
}

/// One month's precomputed potentials and climate drivers (everything that
/// does not depend on the recursion's own running state).
#[derive(Debug, Clone, Copy)]
pub struct MonthlyDrivers {
    pub qom_mm: f64,
    pub rain_mm: f64,
    pub total_area_ha: f64,
    pub domestic_need_m3: f64,
    pub other_need_m3: f64,
    pub gw_dep_pct: f64,
    pub potential_recharge_m3: f64,
    pub potential_et_m3: f64,
    pub iwr_after_canal_m3: f64,
    pub natural_recharge_mm: f64,
    pub irr_water_need_m3: f64,
}

/// State carried from month m-1 into month m.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonthlyStorageState {
    pub storage_m3: f64,
    pub act_recharge_m3: f64,
    pub act_et_m3: f64,
    pub act_iwr_m3: f64,
    pub rejected_recharge_m3: f64,
    pub gw_left_after_rejected_m3: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct MonthlyStorageOutput {
    pub state: MonthlyStorageState,
    pub sw_abstracted_m3: f64,
    pub runoff_captured_m3: f64,
    pub runoff_in_gw_str_m3: f64,
    pub gw_abstracted_m3: f64,
    pub gw_extracted_m3: f64,
    pub final_runoff_mm: f64,
    pub final_recharge_mm: f64,
    pub final_et_mm: f64,
}

fn m3_per_mm(total_area_ha: f64) -> f64 {
    total_area_ha * 10.0
}

/// Runs one step of the monthly recursion (spec.md §4.8, steps 1-15 plus
/// derived bookkeeping). `prev` is `None` for month 0 (all previous-month
/// quantities are 0), and `initial_residual_storage_m3` supplies
/// `ResidualStorage_0` for that case.
pub fn step_monthly_storage(
    month_index: usize,
    prev: Option<MonthlyStorageState>,
    drivers: &MonthlyDrivers,
    caps: &StorageCapacities,
    initial_residual_storage_m3: f64,
) -> MonthlyStorageOutput {
    let prev = prev.unwrap_or_default();
    let area_factor = m3_per_mm(drivers.total_area_ha);

    // Step 1
    let qom_m3 = drivers.qom_mm * area_factor;
    let vrr_m = prev.rejected_recharge_m3 + qom_m3;

    // Step 3
    let gw_need = (drivers.gw_dep_pct / 100.0) * (drivers.domestic_need_m3 + drivers.other_need_m3);
    let sw_need = drivers.domestic_need_m3 + drivers.other_need_m3 - gw_need;

    // Step 4-5
    let sw_abstracted = qom_m3.min(sw_need);
    let v_after_dom_sw = qom_m3 - sw_abstracted;

    // Step 6
    let prev_net = prev.storage_m3 - prev.act_recharge_m3 - prev.act_et_m3 - prev.act_iwr_m3;
    let s_m = caps.s_cap_m3.min(prev_net + vrr_m - sw_abstracted);

    // Step 7: priority split
    let d = drivers.potential_recharge_m3 + drivers.potential_et_m3 + drivers.iwr_after_canal_m3;
    let (act_recharge, act_et, act_iwr) = if d > s_m {
        let scale = safe_divide(s_m, d);
        (
            drivers.potential_recharge_m3 * scale,
            drivers.potential_et_m3 * scale,
            drivers.iwr_after_canal_m3 * scale,
        )
    } else {
        (
            drivers.potential_recharge_m3,
            drivers.potential_et_m3,
            drivers.iwr_after_canal_m3,
        )
    };

    // Step 8-9
    let runoff_captured = if month_index == 0 {
        s_m
    } else {
        s_m - prev_net
    };
    let runoff_left = v_after_dom_sw - runoff_captured;

    // Step 10-11
    let runoff_in_gw_str = caps.ar_cap_m3.min(runoff_left.max(0.0));
    let added_monthly_recharge = act_recharge + runoff_in_gw_str;

    // Step 12
    let residual_storage_m = if month_index == 0 {
        initial_residual_storage_m3
    } else {
        prev.gw_left_after_rejected_m3
    };
    let natural_recharge_m3 = drivers.natural_recharge_mm * area_factor;
    let cum_m = residual_storage_m + added_monthly_recharge + natural_recharge_m3;

    // Step 13
    let gw_abstracted = cum_m.min(gw_need);
    let cum_after_dom = (cum_m - gw_abstracted).max(0.0);

    // Step 14
    let gw_extracted = if drivers.irr_water_need_m3 == 0.0 || act_iwr >= drivers.irr_water_need_m3 {
        0.0
    } else {
        (drivers.irr_water_need_m3 - act_iwr).min(cum_after_dom)
    };

    // Step 15
    let cum_after_crop = cum_after_dom - gw_extracted;
    let rejected_recharge = (cum_after_crop - caps.aquifer_limit_m3).max(0.0);
    let gw_left_after_rejected = cum_after_crop - rejected_recharge;

    // Derived mm + final bookkeeping
    let to_mm = |v: f64| safe_divide(v, area_factor);
    let act_recharge_mm = to_mm(act_recharge);
    let runoff_in_gw_str_mm = to_mm(runoff_in_gw_str);
    let runoff_to_recharge_mm = act_recharge_mm + runoff_in_gw_str_mm;
    let captured_runoff_mm = to_mm(runoff_captured) + runoff_in_gw_str_mm;
    let final_ro_mm = (drivers.qom_mm - captured_runoff_mm).max(0.0);
    let rejected_recharge_mm = to_mm(rejected_recharge);
    let final_runoff_mm = final_ro_mm + rejected_recharge_mm;
    let final_recharge_mm =
        (drivers.natural_recharge_mm - rejected_recharge_mm + runoff_to_recharge_mm).max(0.0);
    let final_et_mm = (drivers.rain_mm - final_runoff_mm - final_recharge_mm).max(0.0);

    MonthlyStorageOutput {
        state: MonthlyStorageState {
            storage_m3: s_m,
            act_recharge_m3: act_recharge,
            act_et_m3: act_et,
            act_iwr_m3: act_iwr,
            rejected_recharge_m3: rejected_recharge,
            gw_left_after_rejected_m3: gw_left_after_rejected,
        },
        sw_abstracted_m3: sw_abstracted,
        runoff_captured_m3: runoff_captured,
        runoff_in_gw_str_m3: runoff_in_gw_str,
        gw_abstracted_m3: gw_abstracted,
        gw_extracted_m3: gw_extracted,
        final_runoff_mm,
        final_recharge_mm,
        final_et_mm,
    }
}

/// Runs the full monthly recursion in ascending month order.
pub fn run_monthly_storage_recursion(
    drivers: &[MonthlyDrivers],
    caps: &StorageCapacities,
    initial_residual_storage_m3: f64,
) -> Vec<MonthlyStorageOutput> {
    let mut out = Vec::with_capacity(drivers.len());
    let mut prev: Option<MonthlyStorageState> = None;
    for (m, d) in drivers.iter().enumerate() {
        let step = step_monthly_storage(m, prev, d, caps, initial_residual_storage_m3);
        prev = Some(step.state);
        out.push(step);
    }
    out
}

/// Monthly infiltration recharge from a farm-pond/check-dam/infiltration-pond
/// structure (spec.md §4.8's `S_cap`/`AR_cap` formulas): `surface_area =
/// volume/depth`, `recharge = surface_area * (infiltration_rate_mm_per_day/1000) * 30`.
/// Fatal (`DivByZeroGuarded`) when the structure has volume but no depth
/// (spec.md §7).
pub fn monthly_infiltration_recharge_m3(
    volume_m3: f64,
    depth_m: f64,
    infiltration_rate_mm_per_day: f64,
) -> DrpfResult<f64> {
    if volume_m3 <= 0.0 {
        return Ok(0.0);
    }
    if depth_m == 0.0 {
        return Err(DrpfError::DivByZeroGuarded(
            "structure surface_area: volume > 0 but depth = 0".to_string(),
        ));
    }
    let surface_area_m2 = volume_m3 / depth_m;
    Ok(surface_area_m2 * (infiltration_rate_mm_per_day / 1000.0) * 30.0)
}

/// `Pct_IWR_met`, spec.md §4.8.
pub fn pct_iwr_met(irr_area_ha: f64, irr_water_need_m3: f64, act_iwr_m3: f64, gw_extracted_m3: f64) -> f64 {
    if irr_area_ha <= 0.0 {
        0.0
    } else if irr_water_need_m3 == 0.0 {
        1.0
    } else {
        (act_iwr_m3 + gw_extracted_m3) / irr_water_need_m3
    }
}
