// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

// `number_of_visits` and `stay_duration` are NOT NULL in the ledger's own
// migration but nullable in ledger files created by earlier tools, which the
// migration adopts unchanged. Rows map NULL to zero.

diesel::table! {
    places (place_id) {
        place_id -> BigInt,
        place_name -> Text,
        number_of_visits -> Nullable<BigInt>,
    }
}

diesel::table! {
    users (user_id) {
        user_id -> BigInt,
        name -> Text,
    }
}

diesel::table! {
    visits (visit_id) {
        visit_id -> BigInt,
        user_id -> BigInt,
        place_id -> BigInt,
        visit_date -> Text,
        stay_duration -> Nullable<BigInt>,
    }
}

diesel::joinable!(visits -> places (place_id));
diesel::joinable!(visits -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(places, users, visits,);
