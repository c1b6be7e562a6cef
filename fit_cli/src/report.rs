//! Plain text rendering of a computed snapshot

use fit_core::{ComputedStats, DamageType, Layer, PerDamageType, Stability};
use std::fmt;

fn damage_label(damage_type: DamageType) -> &'static str {
    match damage_type {
        DamageType::Em => "EM",
        DamageType::Thermal => "TH",
        DamageType::Kinetic => "KI",
        DamageType::Explosive => "EX",
    }
}

fn layer_label(layer: Layer) -> &'static str {
    match layer {
        Layer::Shield => "shield",
        Layer::Armor => "armor",
        Layer::Hull => "hull",
    }
}

/// `mm:ss` for durations
fn clock(secs: f64) -> String {
    let total = secs.max(0.0).round() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

fn percentages(values: &PerDamageType) -> String {
    DamageType::all()
        .iter()
        .map(|dt| format!("{} {:>5.1}%", damage_label(*dt), values.get(*dt) * 100.0))
        .collect::<Vec<_>>()
        .join("  ")
}

fn section(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "{}", title)?;
    writeln!(f, "{}", "-".repeat(title.len()))
}

/// Human readable report of a fitting's statistics
pub struct Report<'a> {
    pub title: &'a str,
    pub stats: &'a ComputedStats,
}

impl<'a> Report<'a> {
    pub fn new(title: &'a str, stats: &'a ComputedStats) -> Self {
        Report { title, stats }
    }

    fn defense(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let defense = &self.stats.defense;
        section(f, "Defense")?;
        writeln!(f, "  profile   {}", percentages(defense.profile.weights()))?;
        for layer in &defense.layers {
            writeln!(
                f,
                "  {:<7} {:>9.0} hp  {}  ehp {:>9.0}",
                layer_label(layer.layer),
                layer.hp,
                percentages(&layer.resistances),
                layer.profile_ehp
            )?;
        }
        writeln!(
            f,
            "  total   {:>9.0} hp  omni ehp {:.0}  profile ehp {:.0}",
            defense.total_hp, defense.total_omni_ehp, defense.total_profile_ehp
        )?;

        let sustain = &defense.sustain;
        if let Some(passive) = sustain.passive_shield {
            writeln!(
                f,
                "  passive shield regen {:.1} hp/s ({:.1} ehp/s)",
                passive.raw, passive.effective
            )?;
        }
        let active = [
            ("shield", sustain.shield_repair),
            ("armor", sustain.armor_repair),
            ("hull", sustain.hull_repair),
        ];
        let mut repairing = 0;
        for (name, rate) in active.iter().filter(|(_, rate)| rate.raw > 0.0) {
            writeln!(
                f,
                "  {} repair {:.1} hp/s ({:.1} ehp/s)",
                name, rate.raw, rate.effective
            )?;
            repairing += 1;
        }
        if repairing > 1 {
            writeln!(f, "  active repair {:.1} ehp/s", sustain.active_effective())?;
        }
        Ok(())
    }

    fn offense(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let offense = &self.stats.offense;
        section(f, "Offense")?;
        if !offense.is_armed() {
            return writeln!(f, "  no active weapons");
        }
        for weapon in &offense.weapons {
            write!(
                f,
                "  {:<5} {}  {:<28} {:>7.1} dps  {:>7.1} volley  {:>5.2} s",
                weapon.slot.kind,
                weapon.slot.index,
                weapon.name,
                weapon.total_dps(),
                weapon.total_volley(),
                weapon.cycle_time_secs
            )?;
            match weapon.application {
                Some(application) => writeln!(f, "  applied {:>5.1}%", application * 100.0)?,
                None => writeln!(f)?,
            }
        }
        writeln!(f, "  total   {:.1} dps  {:.1} volley", offense.dps, offense.volley)?;
        if let Some(applied) = offense.applied_dps {
            writeln!(f, "  applied {:.1} dps", applied)?;
        }
        Ok(())
    }

    fn capacitor(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cap = &self.stats.capacitor;
        section(f, "Capacitor")?;
        writeln!(
            f,
            "  {:.0} GJ, recharge {:.1} s, peak {:.2} GJ/s, drain {:.2} GJ/s ({} users)",
            cap.capacity, cap.recharge_time_secs, cap.peak_recharge_rate, cap.average_drain, cap.active_users
        )?;
        match cap.stability {
            Stability::Stable { equilibrium, low, high } => writeln!(
                f,
                "  stable at {:.1}% (between {:.1}% and {:.1}%)",
                equilibrium * 100.0,
                low * 100.0,
                high * 100.0
            ),
            Stability::Unstable {
                time_to_empty_secs,
                exact: true,
            } => writeln!(f, "  runs dry after {}", clock(time_to_empty_secs)),
            Stability::Unstable {
                time_to_empty_secs, ..
            } => writeln!(f, "  still draining after {}", clock(time_to_empty_secs)),
        }
    }

    fn navigation(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mobility = &self.stats.mobility;
        let targeting = &self.stats.targeting;
        section(f, "Navigation")?;
        writeln!(
            f,
            "  velocity {:.0} m/s, align {:.2} s, signature {:.0} m",
            mobility.max_velocity, mobility.align_time_secs, mobility.signature_radius
        )?;
        writeln!(
            f,
            "  targeting {:.1} km, scan resolution {:.0} mm, {} targets",
            targeting.max_target_range / 1000.0,
            targeting.scan_resolution,
            targeting.max_locked_targets
        )?;
        for lock in &targeting.lock_times {
            writeln!(f, "  lock {:>5.0} m signature in {:.2} s", lock.signature_radius, lock.seconds)?;
        }
        Ok(())
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} (revision {})", self.title, self.stats.revision)?;
        self.defense(f)?;
        self.offense(f)?;
        self.capacitor(f)?;
        self.navigation(f)?;

        if self.stats.has_warnings() {
            section(f, "Warnings")?;
            for warning in &self.stats.warnings {
                writeln!(f, "  {}", warning)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fit_core::{compute, default_catalog, ComputeOptions, EngineConstants, Fitting, ModuleState, Revision, SkillSet, SlotRef};

    fn rifter_stats() -> ComputedStats {
        let catalog = default_catalog().unwrap();
        let rifter = catalog.find_hull("Rifter").unwrap();
        let cannon = catalog.find_module("200mm AutoCannon II").unwrap();
        let fitting = Fitting::new(rifter).with_module(SlotRef::high(0), cannon, ModuleState::Active);
        compute(
            &catalog,
            &fitting,
            &SkillSet::new(),
            &EngineConstants::default(),
            &ComputeOptions::default(),
            Revision(3),
        )
        .unwrap()
    }

    #[test]
    fn test_combined_repair_line() {
        let catalog = default_catalog().unwrap();
        let fitting = Fitting::new(catalog.find_hull("Rifter").unwrap())
            .with_module(SlotRef::mid(0), catalog.find_module("Small Shield Booster II").unwrap(), ModuleState::Active)
            .with_module(SlotRef::low(0), catalog.find_module("Small Armor Repairer II").unwrap(), ModuleState::Active);
        let stats = compute(
            &catalog,
            &fitting,
            &SkillSet::new(),
            &EngineConstants::default(),
            &ComputeOptions::default(),
            Revision(1),
        )
        .unwrap();

        let text = Report::new("Rifter", &stats).to_string();
        assert!(text.contains("shield repair"));
        assert!(text.contains("armor repair"));
        let expected = format!("active repair {:.1} ehp/s", stats.defense.sustain.active_effective());
        assert!(text.contains(&expected), "{}", text);
    }

    #[test]
    fn test_clock() {
        assert_eq!(clock(0.0), "0:00");
        assert_eq!(clock(75.4), "1:15");
        assert_eq!(clock(-3.0), "0:00");
    }

    #[test]
    fn test_report_sections() {
        let stats = rifter_stats();
        let text = Report::new("Rifter", &stats).to_string();
        assert!(text.starts_with("Rifter (revision"));
        for heading in ["Defense", "Offense", "Capacitor", "Navigation"] {
            assert!(text.contains(heading), "missing {}", heading);
        }
        assert!(text.contains("200mm AutoCannon II"));
        assert!(text.contains("stable at 100.0%"));
        assert!(!text.contains("Warnings"));
    }
}
