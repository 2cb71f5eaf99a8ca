// src/classify.rs
//! Free-text role label → [`SlotType`].
//!
//! Three stages, first hit wins:
//! 1. structural pattern families, anchored and case-insensitive;
//! 2. role code names, either as a `(CODE)` tag anywhere in the label or as
//!    the whole label;
//! 3. the table of observed label spellings.
//!
//! Anything left over is [`SlotType::NoType`] with a warning.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::diag::{Extracted, Warning};
use crate::model::SlotType;
use crate::tables::Tables;

static FAMILIES: Lazy<Vec<(SlotType, Regex)>> = Lazy::new(|| {
    use SlotType::*;
    let raw: [(SlotType, &str); 37] = [
        (Co, r"^((CO|Commanding[\s]?Officer)([\s]?\(.*\))?|Platoon (Leader|Commander) \(CO\)|Kommandierender[\s]?Offizier[\s]?(/CO)?|Einsatzleiter|Ilaclar Anführer|Anführer|Kompanieführer \(CO\)|Company[\s]?Leader|Plt Leader \(CO,.*\)|Troop Commander \(CO\)|CO[\s\-]?/[\s\-]?TC|Talibananführer([\s]?\(C.*\))?.*|FBI Agent Teamleader|Lehrgangsleiter)$"),
        (Xo, r"^((XO|Rechte Hand|RTO|Executive[\s]?Officer)([\s]?\(.*\))?|Ass\. Platoonleader \(XO\)|Platoon[\s]?Sergeant \(XO\)|Kommandierender[\s]?Offizier(/XO)?|Assistenz-Leitung|Silah Anführer|Ausführender Offizier/XO|Panzerzugführer \(XO/PL\)|Squad Leader[\s]?\(XO,.*\)|Panzerzugführer[\s]?\(XO.*\)|Troop Sergeant \(XO\)|XO[\s\-]?/[\s\-]?TC|Panzerzugführer[\s]?\(XO.*\)([\s]?-)?|FBI Agent)$"),
        (Col, r"^(CoL|Chief[\s]?of[\s]?Logisti[ck]s?)$"),
        (Jtac, r"^(JTAC|ATC|Joint[\s]?Tactical[\s]?Air[\s]?Controller|Air[\s]?Traffic[\s]?Controller|Air Intelligence Officer)$"),
        (Mio, r"^(MIO|Military[\s]?Intelligence[\s]?Officer)$"),
        // Forward observers are booked as intelligence officers.
        (Mio, r"^(FO|Forward[\s]?Observer)$"),
        (Pl, r"^((Tank[\s\-]?)?Platoon[\s\-]?(Infantry[\s\-]?)?Lead(er)?|Platoon Command(er)?|Panzerzugführer \(PL\)|Platoonleader[\s]?\([^XC].*\))$"),
        (Psg, r"^(Tank[\s\-]?)?Platoon[\s]?(Sergeant|Seargent)([\s]?\([^XC].*\))?$"),
        (Tc, r"^(((Tank|BMP)[\s\-]?)?(Kommandant|Commander)([\s]?\(.*\))?|RIOT-Fahrzeug Kommandant|Squad Leader[\s]?\(BMP Commander\)|Tank[\s\-]?(Platoonleader|Commander))$"),
        (Gnr, r"^(GNR|(Richt|Panzer)?Schütze([\s]?\(.*\))?|RIOT-Fahrzeug Schütze|BMP[\s]{0,2}Gunner|Gunner)$"),
        (Drv, r"^(DRV|(Panzer)?Fahrer([\s]?\(.*\))?|RIOT-Fahrzeug Fahrer|BMP Driver|Driver|Panzerhaubitzen[\s\-]?Fahrer)$"),
        (Tl, r"^((Logisti[ck][\s\-]?)?Team[\s]?(leader|leiter)([\s\-\(SD\)]?)?\*?|Batterieführer|Mörserkommandant|(Ärzte|Medic)[\s\-]?Teamleader|Rebellenführer|Gruppenleiter|Offizier|SWAT-Teamleader|Team Leader/Gunner|EOD[\s\-]?Teamlead(er)?|Mörser[\s\-]?Kommandant|Logistik[\s\-]?Teamleader|Panzerhaubitzen[\s\-]?Kommandant|Senior[\s\-]Rifleman/[\s]?Team[\s\-]?leader|Teamleader \(AK.*\))$"),
        (Sl, r"^(Squad[\s]?lead(er)?[\s]?(\([^XC].*\)|Alpha|Bravo|Charlie|Delta|Echo|Romeo)?|Zellenführer)$"),
        (Ftl, r"^(FTL|Fire[\s]?team[\s\-]?lead(er)?|Truppführer|Scout[\s\-]Teamleader?|Zellenführer[\s]+\(FTL\).*)$"),
        (Ar, r"^(LMG|(Scout[\s\-]?)?Automati[ck][\s]?Rifleman|Autorifleman|Auto\. Rifleman|Leibwache \(AR\)|Automatikschütze|LMG[\s\-]?(Schütze)?|Operator \(Weapon Specialist\)|Maschinengewehr[\s\-]?Schütze|.*\(RPK\).*)$"),
        // The trailing optional group also accepts the empty label.
        (Rfl, r"^((Ass(ist)?\.|Assistant)[\s]?Automati[ck][\s]?Rifleman|Rifleman([\s\-\(SD\)]?)?|Operator|Kämpfer|Polizei-Beamter|SWAT-Beamter|Krimineller|Nahsicherer|Assistant[\s]?Grenadier|Assistent|Mörser Nahsicherer|(Filmproduzent|Kameramann)([\s]?\((AK|PKM).*\))?|(Assist[ea]nt[\s\-]?Scout)?)$"),
        (Gre, r"^Grenadier([\s]\(.*\))?$"),
        (Dm, r"^(DM|Designated[\s]?Marksman|Marksman \(SVDM\)|Marksman|Gruppenscharfschütze|Leibwache \(DM\)|SVD Rifleman|Rifleman[\s]?\(SVD\))$"),
        (Cmdc, r"^((Scout[\s\-]?|Rifleman/)?Combat[\s]?Medic|Notfallsanitäter|Leibwache \(MED\)|Para[\s\-]?medic|Corpsman|Rifleman[\s]?\(Medic\)|Operator \(Medic([\s]?Specialist)?\)|Rifleman/Medic|Flight[\s\-]Medic)$"),
        (Atr, r"^Rifleman[\s\-]?\(?AT\)?$"),
        (Aar, r"^Rifleman[\s]?AA$"),
        (Mg, r"^(MG|(Heavy)?[\s]?Machine[\s]?gunner([\s\-]?\(PKM\))?|Heavy[\s]?Automati[ck][\s]?Rifleman|MMG Rifleman|MG[0-9][\s\-]?Schütze)$"),
        (Amg, r"^(AMG|Ass(ist)?\.[\s]?Machinegunner|Assistent[\s]?Automati[ck][\s]?Rifleman|PKP-Ass(ist)?(\.)?|Assistant MMG Rifleman|Munitionsträger([\s\-\(SD\)]?)?)$"),
        (At, r"^(AT[\s\-]?(Specialist|Soldat)?|Missile[\s]?Specialist[\s]?\(Javelin\)|Heavy[\s]?(Anti-Tank|AT)[\s]?Rifleman)$"),
        (Aat, r"^(Ass(ist)?\.[\s]?AT|Missile[\s]?Specialist[\s]?\((Asst.|Assistent|Ass(ist)?.)\)|Assistent[\s]?(Anti-Tank|AT)[\s]?Rifleman|(Assistant|Ass(ist)?\.)[\s]?AT[\s\-]?Specialist)$"),
        (Ce, r"^(EOD|Explosiv[e]?[\s]?Ordnance[\s]?Disposel|Explosiv[e]?[\s]?Expert|Explosiv[e]?[\s\-]?Specialist|Sprengstoff Spezialist|Pionier|EOD[\s\-]?Specialist|Operator \(Explosi(on|ve) Specialist\))$"),
        (Snp, r"^((Scout[\s\-]?)?Sniper|Scharfschütze|SWAT-Scharfschütze)$"),
        (Spt, r"^((Scout[\s\-]?)?Spotter|SWAT-Spotter)$"),
        (Log, r"^Logistik(er)?([\s]\(.*\))?$"),
        (Pil, r"^(Pilot([\s]\(.*\))?([\s\-]?(Medevac|Sicherung).*)?|Rottenführer)$"),
        (Cpil, r"^Co[\.\-]Pilot([\s]\(.*\))?$"),
        (Wco, r"^Fixed-wing Pilot [12] \(.*\)$"),
        (Wso, r"^Gunner \(UH-80\)$"),
        (Mdc, r"^((Platoon|Company)?[\s]?Medic([\s]\(.*\)?)?|Internist|Chirurg|Senior Corpsman|Platoon Corpsman|Notarzt|Notfall[\s\-]?Sanitäter|Sanitäter|(Field[\s\-]?)?Surgeon)$"),
        (Acso, r"^(Mörser|Panzerhaubitzen?)[\s\-]?schütze$"),
        (ZcPlus, r"^(Geisel|Geiselnehmer/CO\+|Co\+([\s\-]?Spieler)?)$"),
        (Other, r"^(Door[\s\-]?Gunner|BB(-)?Spieler[\s]?(\(.*\))?|Air Support Control Officer|Assistant Gunner|\?\?\?|Seiten[\s\-]?schütze)$"),
    ];
    raw.into_iter()
        .map(|(t, p)| (t, Regex::new(&join!("(?i)", p)).expect("valid role pattern")))
        .collect()
});

/// Stage 1.
fn by_family(label: &str) -> Option<SlotType> {
    FAMILIES.iter().find(|(_, re)| re.is_match(label)).map(|(t, _)| *t)
}

/// Stage 2. A `(CODE)` tag overrides whatever matched before it; a bare code
/// only counts while nothing has matched.
fn by_code_name(label: &str) -> Option<SlotType> {
    let lower = label.to_lowercase();
    let mut found = None;
    for t in SlotType::ALL {
        let code = t.code().to_lowercase();
        if lower.contains(&join!("(", &code, ")")) {
            found = Some(t);
        } else if found.is_none() && lower == code {
            found = Some(t);
        }
    }
    found
}

/// Classify one role label. Total: never fails, falls back to `NoType`.
pub fn classify(label: &str, tables: &Tables) -> Extracted<SlotType> {
    let found = by_family(label)
        .or_else(|| by_code_name(label))
        .or_else(|| tables.slot_label(label))
        .unwrap_or(SlotType::NoType);

    if found == SlotType::NoType {
        Extracted::warned(found, Warning::UnknownSlotType(s!(label)))
    } else {
        Extracted::clean(found)
    }
}
