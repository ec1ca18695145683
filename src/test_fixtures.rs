//! Small source tables shared by unit tests.
//!
//! Latest date is 1/24/20. Kept counties: Autauga, Baldwin and Bibb
//! (Alabama), Aleutians East (Alaska, zero population) and Adjuntas
//! (Puerto Rico). Bibb has no county-reference row; its population only
//! comes from the deaths series. Guam (`66` pads to `00066`), cruise ships,
//! `Out of AL` and an unassigned blank-FIPS row are all excluded.

use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::source::{Dataset, RawTable};

pub const CONFIRMED_CSV: &str = "\
UID,iso2,iso3,code3,FIPS,Admin2,Province_State,Country_Region,Lat,Long_,Combined_Key,1/22/20,1/23/20,1/24/20
84001001,US,USA,840,1001.0,Autauga,Alabama,US,32.53952745,-86.64408227,\"Autauga, Alabama, US\",0,40,100
84001003,US,USA,840,1003.0,Baldwin,Alabama,US,30.72774991,-87.72207058,\"Baldwin, Alabama, US\",10,90,150
84001007,US,USA,840,1007.0,Bibb,Alabama,US,32.99642064,-87.12511459,\"Bibb, Alabama, US\",0,5,8
84002013,US,USA,840,2013.0,Aleutians East,Alaska,US,55.32218399,-161.9723925,\"Aleutians East, Alaska, US\",0,0,0
84072001,US,USA,840,72001.0,Adjuntas,Puerto Rico,US,18.18027631,-66.75475717,\"Adjuntas, Puerto Rico, US\",1,2,3
316,GU,GUM,316,66.0,,Guam,US,13.4443,144.7937,\"Guam, US\",5,6,7
84088888,US,USA,840,88888.0,,Diamond Princess,US,0.0,0.0,\"Diamond Princess, US\",40,45,49
84080001,US,USA,840,80001.0,Out of AL,Alabama,US,0.0,0.0,\"Out of AL, Alabama, US\",1,1,1
84099999,US,USA,840,99999.0,,Grand Princess,US,0.0,0.0,\"Grand Princess, US\",20,21,22
84090001,US,USA,840,,Unassigned,Alabama,US,0.0,0.0,\"Unassigned, Alabama, US\",3,3,3
";

pub const DEATHS_CSV: &str = "\
UID,iso2,iso3,code3,FIPS,Admin2,Province_State,Country_Region,Lat,Long_,Combined_Key,Population,1/22/20,1/23/20,1/24/20
84001003,US,USA,840,1003.0,Baldwin,Alabama,US,30.72774991,-87.72207058,\"Baldwin, Alabama, US\",3100,0,3,6
84001001,US,USA,840,1001.0,Autauga,Alabama,US,32.53952745,-86.64408227,\"Autauga, Alabama, US\",2100,0,2,5
84001007,US,USA,840,1007.0,Bibb,Alabama,US,32.99642064,-87.12511459,\"Bibb, Alabama, US\",500,0,0,1
84002013,US,USA,840,2013.0,Aleutians East,Alaska,US,55.32218399,-161.9723925,\"Aleutians East, Alaska, US\",0,0,0,0
84072001,US,USA,840,72001.0,Adjuntas,Puerto Rico,US,18.18027631,-66.75475717,\"Adjuntas, Puerto Rico, US\",17000,0,0,1
316,GU,GUM,316,66.0,,Guam,US,13.4443,144.7937,\"Guam, US\",160000,0,1,1
84088888,US,USA,840,88888.0,,Diamond Princess,US,0.0,0.0,\"Diamond Princess, US\",0,0,1,1
84080001,US,USA,840,80001.0,Out of AL,Alabama,US,0.0,0.0,\"Out of AL, Alabama, US\",0,0,0,0
84099999,US,USA,840,99999.0,,Grand Princess,US,0.0,0.0,\"Grand Princess, US\",0,0,0,1
84090001,US,USA,840,,Unassigned,Alabama,US,0.0,0.0,\"Unassigned, Alabama, US\",0,0,0,2
";

pub const STATES_CSV: &str = "\
State/Territory,Union Status,Code,lat,lon,Population,State FIPS
Alabama,State,AL,32.318231,-86.902298,300000,1
Alaska,State,AK,63.588753,-154.493062,100000,2
Puerto Rico,Territory,PR,18.220833,-66.590149,50000,72
Guam,Territory,GU,13.444304,144.793731,160000,66
";

pub const COUNTIES_CSV: &str = "\
FIPS,Admin2,Province_State,Lat,Long_,Population
1001,Autauga,Alabama,32.53952745,-86.64408227,2000
1003,Baldwin,Alabama,30.72774991,-87.72207058,3000
2013,Aleutians East,Alaska,55.32218399,-161.9723925,0
72001,Adjuntas,Puerto Rico,18.18027631,-66.75475717,17000
";

pub fn csv_for(dataset: Dataset) -> &'static str {
    match dataset {
        Dataset::Confirmed => CONFIRMED_CSV,
        Dataset::Deaths => DEATHS_CSV,
        Dataset::StateStats => STATES_CSV,
        Dataset::CountyStats => COUNTIES_CSV,
    }
}

pub fn raw(dataset: Dataset) -> RawTable {
    RawTable::from_csv_reader(dataset.as_str(), csv_for(dataset).as_bytes())
        .expect("fixture csv parses")
}

/// Route `tracing` output through the test harness.
pub fn init_test_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,covidstats=debug")),
        )
        .with_test_writer()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
