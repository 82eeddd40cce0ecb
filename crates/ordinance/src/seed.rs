//! Built-in ordinance reference summaries.
//!
//! Each entry is the jurisdiction's local rules followed by the federal
//! baseline. Summaries are advisory reference text, not certified law.

const FEDERAL_BASELINE: &str = "\
FEDERAL BASELINE
- Fair Housing Act, 42 U.S.C. 3604(f)(3)(B): refusing a reasonable accommodation for a person with a disability is discrimination. Assistance animals (service animals and emotional support animals) are not pets.
- HUD Notice FHEO-2020-01: housing providers may not charge pet deposits, pet fees or pet rent for assistance animals, and breed, size and weight limits may not be applied to assistance animals.
- Advertising: 42 U.S.C. 3604(c) prohibits notices or advertisements that indicate a preference, limitation or discrimination based on disability, including statements such as \"no service animals\" or \"no emotional support animals\".";

const DENVER: &str = "\
DENVER, COLORADO
- Denver Revised Municipal Code 8-67 (as amended by voter-approved Ordinance 20-0291, 2020): the former pit bull ban was repealed. Housing providers may not refuse, restrict or surcharge a tenancy based on a dog's breed or perceived breed; blanket \"no aggressive breeds\" or named-breed exclusions are treated as breed-based restrictions.
- Colorado HB 23-1068 (Pet Animal Ownership in Housing): a pet security deposit may not exceed $300 and must be refundable on the same terms as the general security deposit; monthly pet rent may not exceed the greater of $35 or 1.5% of monthly rent.
- Colorado Revised Statutes 38-12-103: security deposits are refundable; non-refundable pet deposits are not permitted.";

const AUSTIN: &str = "\
AUSTIN, TEXAS
- Austin City Code Chapter 5-1 (Housing Discrimination): prohibits discriminatory advertising and refusal of reasonable accommodations, mirroring and extending federal protections.
- Texas Property Code 92.102-92.109: a security deposit, including any pet deposit, must be refunded less itemized damages within 30 days of surrender; a deposit labeled non-refundable may not be retained without itemized damage.
- Breed, size and weight limits on ordinary pets are permitted but may not be applied to assistance animals.";

const SEATTLE: &str = "\
SEATTLE, WASHINGTON
- Seattle Municipal Code 7.24.035: a pet damage deposit may not exceed 25% of the first full month's rent, and the total of security deposit and non-refundable move-in fees may not exceed one month's rent.
- RCW 59.18.260 and 59.18.285: deposits must be refundable and documented with a written condition checklist; any non-refundable fee must be identified in writing as non-refundable.
- Seattle Municipal Code 14.08: prohibits advertising that limits or discriminates against persons with disabilities who use assistance animals.";

const PORTLAND: &str = "\
PORTLAND, OREGON
- ORS 90.300: security deposits, including pet deposits, are refundable; landlords may not increase a deposit during the first year of tenancy.
- ORS 90.302: landlords may not charge non-refundable fees except for specific enumerated items; a non-refundable pet fee is not an enumerated item.
- Portland City Code 30.01.087: deposit accounting and return requirements apply to all deposits collected at move-in.";

const CHICAGO: &str = "\
CHICAGO, ILLINOIS
- Chicago Residential Landlord and Tenant Ordinance, Municipal Code 5-12-080: security deposits (including pet deposits) must be held and returned with required interest; non-refundable deposits are not security deposits and may not be labeled as such.
- Chicago Human Rights Ordinance, Municipal Code 5-8-030: prohibits discriminatory housing advertisements, including refusal of assistance animals.
- Illinois Assistance Animal Integrity Act (310 ILCS 120): fees and breed or weight limits may not be imposed on assistance animals.";

const BOSTON: &str = "\
BOSTON, MASSACHUSETTS
- Massachusetts General Laws c. 186, 15B(1)(b): at or before the start of a tenancy a landlord may collect only first month's rent, last month's rent, a security deposit of no more than one month's rent and a lock change fee. Separate pet deposits, pet fees or non-refundable pet charges beyond these amounts are prohibited.
- Massachusetts General Laws c. 151B, 4(7A): reasonable accommodation of assistance animals is required; advertisements may not exclude them.";

const SAN_FRANCISCO: &str = "\
SAN FRANCISCO, CALIFORNIA
- California Civil Code 1950.5 (as amended by AB 12, 2023): total security deposits, including any pet deposit, may not exceed one month's rent, and all deposits are refundable; non-refundable pet deposits are prohibited.
- San Francisco Administrative Code 37.9: a landlord may not evict for adding a pet where a rent-controlled lease is silent, and may not unreasonably refuse a reasonable accommodation.
- California Government Code 12927 and 12955: prohibits housing advertisements expressing a limitation based on disability, including refusing assistance animals.";

/// Seeded `(jurisdiction, local text)` pairs.
const LOCAL: &[(&str, &str)] = &[
    ("Denver", DENVER),
    ("Austin", AUSTIN),
    ("Seattle", SEATTLE),
    ("Portland", PORTLAND),
    ("Chicago", CHICAGO),
    ("Boston", BOSTON),
    ("San Francisco", SAN_FRANCISCO),
];

/// Built-in jurisdictions with their full reference text.
pub fn entries() -> impl Iterator<Item = (&'static str, String)> {
    LOCAL
        .iter()
        .map(|(name, local)| (*name, format!("{}\n\n{}", local, FEDERAL_BASELINE)))
}
